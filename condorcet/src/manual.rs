/*!

This is the long-form manual for `condorcet` and its command line tool `ctally`.

## Ballots

Every ballot must rank **all** the candidates, most preferred first, each
candidate exactly once. Any other ballot (missing candidates, extra entries,
unknown names, repeated names) is not counted. `ctally` reports the number of
rejected ballots in its summary and logs the reason for each of them.

The winner is the candidate who beats every other candidate in one-to-one
contests by a strict majority. Ties count as a loss. With cyclic majorities
there is no winner, and the summary reports `null`.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values
* `xlsx` Excel spreadsheets

### csv

Each column (in order) starting from the first vote column is a choice. The
name of the choice in the header is not significant.

```text
id,count,choice 1,choice 2,choice 3
id1,23,Alice,Charlie,Bob
id2,19,Bob,Charlie,Alice
```

The `id` and `count` columns are optional. Empty trailing cells are ignored.
See the [Configuration section](#configuration) on controlling the optional
rows and columns.

### xlsx

Same layout as `csv`, in the first worksheet of the workbook (or the worksheet
given by `excelWorksheetName`). The first row is treated as a header.

## Configuration

`ctally` can run directly from the command line:

```bash
ctally -i ballots.csv --candidates Alice --candidates Bob --candidates Charlie
```

or from a configuration file in JSON, loosely following the RCTab
conventions:

```json
{
  "outputSettings": {
    "contestName": "Board election",
    "outputDirectory": "output",
    "contestDate": "2022-10-21"
  },
  "cvrFileSources": [
    {
      "provider": "csv",
      "filePath": "ballots.csv",
      "firstVoteColumnIndex": 3,
      "firstVoteRowIndex": 2,
      "idColumnIndex": 1,
      "countColumnIndex": 2
    }
  ],
  "candidates": [
    { "name": "Alice" },
    { "name": "Bob" },
    { "name": "Charlie", "code": "C" }
  ]
}
```

The order of the candidates is the order of the rows and columns of the
pairwise matrix in the output. A candidate may also have a `code`: ballots
can then name the candidate either by name or by code (`C` or `Charlie` above),
while the summary always uses the name. File paths are relative to the
configuration file.

FileSource options:
 - `provider` (string): `csv` or `xlsx`.
 - `filePath` (string): the ballot file.
 - `firstVoteColumnIndex` (number, string or Excel column letter, default 1):
   the first column holding a choice. Indices start at 1.
 - `firstVoteRowIndex` (number or string, default 1): the first row holding
   a ballot. For `csv`, use 2 to skip a header.
 - `idColumnIndex` (optional): the column holding the ballot identifier.
 - `countColumnIndex` (optional): the column holding the number of times the
   ballot was cast. If not provided, every ballot is counted once.
 - `excelWorksheetName` (string, optional): for Excel inputs, the worksheet.

## Output

The summary is written in JSON:

```text
{
  "config": { "contest": "Board election", "date": "2022-10-21", ... },
  "results": {
    "winner": "Charlie",
    "numVoters": "60",
    "rejected": "0",
    "pairwise": [
      { "candidate": "Alice", "opponent": "Bob", "wins": "25", "losses": "35" },
      ...
    ]
  }
}
```

Passing `--reference` with a previously generated summary checks that the
outcome did not change.

 */
