/*!

This is the long-form manual for `ward_access` and `wardtrack`.

## Roles

Every account has one of three roles. Volunteers also carry a level.

| Account             | Dashboard | Data entry | Volunteers | Voters | Edits voters | Sees parties |
|---------------------|-----------|------------|------------|--------|--------------|--------------|
| admin               | yes       | yes        | yes        | all    | yes          | yes          |
| overview            | yes       |            | yes        | all    |              |              |
| volunteer, level 2  |           |            |            | own    | yes          |              |
| volunteer, level 1  |           |            |            | own    |              |              |

Opening a page that the role does not allow is not an error: the session is
sent back to the voter list. A level 1 volunteer starts with the list of their
LDF voters who have not voted yet, and that list refreshes itself every 5 minutes.

## Divisions

Only administrators see the party of a voter. Everybody else sees a division
letter. Two letter schemes are supported, selected with `divisionScheme` in the
ward file:

| party   | `sequential` (default) | `partyInitials` |
|---------|------------------------|-----------------|
| ldf     | Division A             | Division L      |
| udf     | Division B             | Division U      |
| bjp     | Division C             | Division B      |
| other   | Division D             | Division O      |
| unknown | -                      | -               |

Non-administrators also type division letters when they edit a voter
(`--party A` or `--party "Division A"`).

## The ward file

The ward is a JSON file:

```json
{
  "wardName": "Ward 14",
  "divisionScheme": "sequential",
  "pageSize": 50,
  "settings": { "votingEnabled": true },
  "users": [
    { "id": 1, "username": "admin", "role": "admin",
      "passwordSha256": "<hex digest of the password>" }
  ],
  "volunteers": [
    { "id": 1, "volunteer_id": 101, "name": "Thara 1", "level": "level2" }
  ],
  "voters": [
    { "id": 1, "serial_no": 1, "name_en": "Anitha K", "name_ml": "അനിത കെ",
      "house_name_en": "Puthenveedu", "status": "active", "party": "ldf",
      "has_voted": false, "gender": "F", "age": 43, "level2_volunteer": 1 }
  ]
}
```

Users of the `volunteer` role also carry a `volunteer` object with the
volunteer record they log in as.

Voter statuses are `active`, `out_of_station`, `deceased`, `postal_vote` and
`deleted`. Any other status is kept as it is, and such a voter cannot be
marked through the data entry. Deleted voters are not counted in the dashboard.

## The local store

`wardtrack` keeps a small JSON file next to the ward file (`--store`) with
the language preference, the logged-in user and the list of voters marked
through the data entry on this machine. It is never merged back into the
ward file.

## Reports

`wardtrack export` writes a JSON report of the voted voters. With
`--ldf-only`, the report only contains LDF voters, and the percentage is
computed against the sum of the LDF voters of every level 2 volunteer (and
not against the ward total). With `--reference`, the summary is compared with
an earlier report and the differences are printed.

## Importing parties

Administrators can set the party of many voters at once from an Excel
workbook listing serial numbers:

```bash
wardtrack import-party ldf_list.xlsx --party ldf --range A1:R26 --dry-run
```

Every cell of the worksheet (or of the range) holding a positive whole number
is read as a serial number. Other cells are skipped. The command prints the
voters it changes, then the serial numbers it could not find.

## Importing the voter lists

The voter lists come as CSV files, one in English and optionally the same list
in Malayalam. Lines are matched on the `Serial No.` column:

```bash
wardtrack import-voters VotersList_en.csv --ml-csv VotersList_ml.csv
```

The English list provides `New SEC ID No.`, `Name`, `House Name`, `Gender`,
`Age` and `Category`. The Malayalam list only provides `Name` and `House Name`.
A voter whose SEC id is already in the ward is updated; its party, voted flag,
volunteers and notes are kept. Lines without an SEC id or a name are skipped.
Voters of the `deletion` category get the `deleted` status. With `--clear`,
the voters of the ward are replaced.

## Assigning tharas

The thara list is a CSV file with the columns `VL No` (the serial number of a
voter) and `Thara`. Thara 3 is the level 2 volunteer with the user name `th03`
in the `volunteers` of the ward file:

```bash
wardtrack assign-tharas TharaList.csv --dry-run
```

 */
