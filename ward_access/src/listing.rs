//! The state of a filtered, paginated voter list.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::config::*;
use crate::services::VoterDirectory;
use crate::session::Capabilities;

#[derive(PartialEq, Debug, Clone)]
pub struct VoterListing {
    filters: VoterFilters,
    page: u32,
    page_size: u32,
    voters: Vec<Voter>,
    count: Option<u64>,
    next: Option<u32>,
    auto_refresh: Option<Duration>,
    last_fetch: Option<DateTime<Utc>>,
}

impl VoterListing {
    /// An empty list with the default filters of the role.
    pub fn for_capabilities(caps: &Capabilities) -> VoterListing {
        VoterListing {
            filters: caps.default_filters.clone(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            voters: Vec::new(),
            count: None,
            next: None,
            auto_refresh: caps.auto_refresh,
            last_fetch: None,
        }
    }

    pub fn with_page_size(self, page_size: u32) -> VoterListing {
        VoterListing {
            page_size: page_size.max(1),
            ..self
        }
    }

    pub fn filters(&self) -> &VoterFilters {
        &self.filters
    }

    /// Replaces the filters and goes back to the first page.
    pub fn set_filters(&mut self, filters: VoterFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let search = search.filter(|s| !s.trim().is_empty());
        self.set_filters(VoterFilters {
            search,
            ..self.filters.clone()
        });
    }

    pub fn set_has_voted(&mut self, has_voted: Option<bool>) {
        self.set_filters(VoterFilters {
            has_voted,
            ..self.filters.clone()
        });
    }

    pub fn set_party(&mut self, party: Option<Party>) {
        self.set_filters(VoterFilters {
            party,
            ..self.filters.clone()
        });
    }

    pub fn set_status(&mut self, status: Option<VoterStatus>) {
        self.set_filters(VoterFilters {
            status,
            ..self.filters.clone()
        });
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn query(&self) -> VoterQuery {
        VoterQuery::new(self.filters.clone())
            .with_page(self.page)
            .with_page_size(self.page_size)
    }

    /// Runs the current query. The result replaces whatever was shown before.
    pub fn fetch(
        &mut self,
        dir: &dyn VoterDirectory,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        let res = dir.list(&self.query()).map_err(|reason| {
            warn!("fetch: {}", reason);
            FlowError::LoadFailed { reason }
        })?;
        debug!(
            "fetch: page {} got {} voters (count: {:?})",
            self.page,
            res.results.len(),
            res.count
        );
        self.voters = res.results;
        self.count = res.count;
        self.next = res.next;
        self.last_fetch = Some(now);
        Ok(())
    }

    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn total_pages(&self) -> u32 {
        match self.count {
            Some(c) => {
                let size = self.page_size.max(1) as u64;
                ((c + size - 1) / size).max(1) as u32
            }
            None if self.has_next() => self.page + 1,
            None => self.page,
        }
    }

    /// True when the list refreshes itself and the refresh period has elapsed.
    pub fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        match (self.auto_refresh, self.last_fetch) {
            (Some(period), Some(last)) => now
                .signed_duration_since(last)
                .to_std()
                .map_or(false, |elapsed| elapsed >= period),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::testing::*;
    use chrono::TimeZone;

    fn t(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 9, 8, min, 0).unwrap()
    }

    #[test]
    fn level1_list_starts_with_its_defaults_and_refreshes() {
        let caps = Capabilities::resolve(&level1_user(4));
        let mut mine: Vec<Voter> = (1..=3)
            .map(|i| {
                let mut v = voter(i, i);
                v.level1_volunteer = Some(4);
                v
            })
            .collect();
        mine[0].party = Party::Ldf;
        mine[1].party = Party::Ldf;
        mine[1].has_voted = true;
        let mut dir = MemoryDirectory::new(mine);
        dir.set_viewer(&caps);

        let mut list = VoterListing::for_capabilities(&caps);
        assert_eq!(list.filters().party, Some(Party::Ldf));
        assert!(!list.refresh_due(t(0)));
        list.fetch(&dir, t(0)).unwrap();
        assert_eq!(list.voters().len(), 1);
        assert!(!list.refresh_due(t(4)));
        assert!(list.refresh_due(t(5)));

        // Defaults can be widened.
        list.set_filters(VoterFilters::default());
        list.fetch(&dir, t(6)).unwrap();
        assert_eq!(list.voters().len(), 3);
    }

    #[test]
    fn filter_changes_go_back_to_the_first_page() {
        let caps = Capabilities::resolve(&admin_user());
        let dir = MemoryDirectory::new((1..=120).map(|i| voter(i, i)).collect());
        let mut list = VoterListing::for_capabilities(&caps);
        list.set_page(3);
        list.fetch(&dir, t(0)).unwrap();
        assert_eq!(list.voters().len(), 20);
        assert_eq!(list.total_pages(), 3);
        assert!(!list.has_next());
        assert!(!list.refresh_due(t(30)));

        list.set_search(Some("11".to_string()));
        assert_eq!(list.page(), 1);
        list.fetch(&dir, t(1)).unwrap();
        assert_eq!(list.count(), Some(11));
    }

    #[test]
    fn load_failure_keeps_the_previous_list() {
        let caps = Capabilities::resolve(&admin_user());
        let mut dir = MemoryDirectory::new(vec![voter(1, 1)]);
        dir.fail_list_call(2);
        let mut list = VoterListing::for_capabilities(&caps);
        list.fetch(&dir, t(0)).unwrap();
        let res = list.fetch(&dir, t(1));
        assert!(matches!(res, Err(FlowError::LoadFailed { .. })));
        assert_eq!(list.voters().len(), 1);
    }
}
