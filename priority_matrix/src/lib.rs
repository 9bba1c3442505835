/*!
Scoring engine for collaborative prioritization.

Participants of a session score every initiative of a shared backlog on two
axes, impact and complexity, from 0 to 100. The votes are combined into one
weighted position per initiative, which places it in one of the four
quadrants of the matrix.

```
use priority_matrix::*;

let records = parse_backlog(
    "team;metric;objective;key result;priority;name\n\
     OPS;NPS;Retain;+5 NPS;Alta;Self-service refunds\n",
)?;

let mut store = MemoryStore::new("q3-planning");
let ids = store.replace_all(records)?;

let ana = User::new("u1", "Ana", "OPS");
let snapshot = store.snapshot();
assert_eq!(next_initiative(&snapshot.initiatives, &ana.id).map(|i| &i.id), Some(&ids[0]));

let update = cast_vote(&snapshot.initiatives, &ids[0], &ana, 80, 30, 0)?;
store.update_votes(&update.initiative_id, update.votes)?;

let plotted = plot(&store.snapshot().initiatives, &TeamRoster::default());
assert_eq!(plotted[0].quadrant(), Quadrant::QuickWins);
# Ok::<(), MatrixErrors>(())
```

See the [manual] for the ingestion format and the weighting rules.
*/
mod aggregate;
mod config;
mod ingest;
pub mod manual;
mod priority;
mod queue;
mod session;
mod store;
mod votes;

pub use crate::aggregate::*;
pub use crate::config::*;
pub use crate::ingest::*;
pub use crate::queue::*;
pub use crate::session::*;
pub use crate::store::*;
pub use crate::votes::*;
