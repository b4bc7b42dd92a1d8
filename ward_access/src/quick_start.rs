/*!

# Quick start: election day at the booth

This example runs the data entry of a ward end to end from a terminal, using
the sample ward shipped in the `testdata` directory of the repository.

**Logging in** Every command works on a ward file and on a local store file.
Start by logging in as the administrator (the password of the sample ward is `admin123`):

```bash
wardtrack --ward testdata/ward_sample.json login admin --password admin123
```

**Marking voters** The quick data entry takes serial numbers, one at a time,
and marks the voters as voted:

```bash
wardtrack --ward testdata/ward_sample.json entry --serial 1 --serial 3
```

When no `--serial` flag is given, the serial numbers are read from the
standard input, one per line, until the end of the input. Each line gets an answer:

```text
✓ Anitha K (S.No: 1) marked as voted
Kesavan Nair (S.No: 3) is marked as Deceased
```

A voter is never marked twice, and voters who are not active are never
marked. The voters marked on this machine are listed with `entry --history`.

**Following the turnout** The dashboard figures are printed with:

```bash
wardtrack --ward testdata/ward_sample.json stats
```

and a report of the voted voters is written with:

```bash
wardtrack --ward testdata/ward_sample.json export --ldf-only --out reports/
```

Switch the display to Malayalam with `wardtrack lang ml`. See the
[manual](../manual/index.html) for the roles, the ward file and the reports.

*/
