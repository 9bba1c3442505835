/*!

This is the long-form manual for `priority_matrix` and `prioriza`.

## Input formats

The following formats are supported:
* `csv` Comma or semicolon separated values
* `xlsx` Excel workbooks (command line only)

### `csv`

The first line is a header. Its content is ignored, except to choose the
delimiter: if the header contains a `;`, every line is split on `;`,
otherwise on `,`. Blank lines are skipped. A file needs a header and at least
one data line.

Columns are positional:

| column | field      | when missing or empty |
|--------|------------|-----------------------|
| 1      | team       | `General`             |
| 2      | metric     | `N/A`                 |
| 3      | objective  | `N/A`                 |
| 4      | key result | `N/A`                 |
| 5      | priority   | `Low`                 |
| 6      | name       | `Untitled initiative` |

```text
Team;Metric;Objective;Key result;Priority;Initiative
OPS;NPS;Retain customers;+5 NPS;Alta;"Self-service refunds; phase 1"
BizDev;Revenue;Expand;3 new partners;Medium;Partner portal
```

Fields may be quoted with `"`. Inside quotes, the delimiter is plain text and
`""` stands for one `"`. Surrounding spaces are removed.

The priority column accepts `High`/`Alta` and `Medium`/`Média`. Any other
value, including an empty one, is `Low`.

Note: the name column is also copied into the description of the initiative.

### `xlsx`

The first worksheet (or the one given with `--excel-worksheet-name`) is read
with the same columns as the CSV format. The first row is the header.

## Votes

A vote holds an impact and a complexity score between 0 and 100. Values out of
range are clamped. A participant has at most one vote per initiative: voting
again replaces the previous vote, which is not kept.

## Voting queue

Each participant is offered the initiatives they did not score yet, high
priority first, then medium, then low. Within a priority, initiatives are
sorted by team name.

## Weighting

The position of an initiative is the weighted mean of its votes:
- on the impact axis, votes from the oversight team (the last team of the
  roster, `Diretoria` by default) count twice;
- on the complexity axis, votes from the team owning the initiative count
  twice.

Initiatives without votes have no position and are not plotted.

## Quadrants

Each axis is split at 50:

|                | complexity < 50 | complexity >= 50 |
|----------------|-----------------|------------------|
| impact >= 50   | Quick Wins      | Big Projects     |
| impact < 50    | Fill-ins        | Thankless        |

## Configuration

`prioriza` accepts a configuration file in JSON:

```text
{
  "sessionId": "q3-planning",
  "teams": ["OPS", "Product Marketing", "Produtos", "BizDev", "Diretoria"]
}
```

The last team is the oversight team.

 */
