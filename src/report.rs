//! CSV export of run outputs: the proportion series, the immunization ranking and the full
//! per-day status table.

use crate::{
    error::ContagionError,
    graph::ContactGraph,
    status::{DayHistory, InfectionStatus},
};
use log::debug;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ProportionRow {
    day: usize,
    proportion: f64,
}

#[derive(Serialize)]
struct ImmunizedRow<'a> {
    rank: usize,
    id: &'a str,
}

#[derive(Serialize)]
struct StatusRow<'a> {
    day: usize,
    id: &'a str,
    status: InfectionStatus,
}

/// One `day,proportion` row per day, day 0 first.
pub fn write_proportions(file_path: &Path, proportions: &[f64]) -> Result<(), ContagionError> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (day, proportion) in proportions.iter().enumerate() {
        writer.serialize(ProportionRow {
            day,
            proportion: *proportion,
        })?;
    }
    writer.flush()?;
    debug!("wrote {} days to {}", proportions.len(), file_path.display());
    Ok(())
}

/// One `rank,id` row per immunized person, rank 1 first.
pub fn write_immunized(file_path: &Path, immunized: &[String]) -> Result<(), ContagionError> {
    // The header is written by hand so that an empty ranking still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(file_path)?;
    writer.write_record(["rank", "id"])?;
    for (idx, id) in immunized.iter().enumerate() {
        writer.serialize(ImmunizedRow { rank: idx + 1, id })?;
    }
    writer.flush()?;
    Ok(())
}

/// One `day,id,status` row per person per recorded day.
pub fn write_snapshots(
    file_path: &Path,
    graph: &ContactGraph,
    history: &DayHistory,
) -> Result<(), ContagionError> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for snapshot in history.snapshots() {
        for person_id in graph.people() {
            if let Some(status) = snapshot.status(person_id) {
                writer.serialize(StatusRow {
                    day: snapshot.day(),
                    id: graph.label(person_id),
                    status,
                })?;
            }
        }
    }
    writer.flush()?;
    debug!(
        "wrote {} snapshots to {}",
        history.len(),
        file_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        context::Context,
        graph::ContextGraphExt,
        status::ContextStatusExt,
        InfectionStatus::{Infected, Susceptible},
    };
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn proportions_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("proportions.csv");
        write_proportions(&path, &[0.25, 0.5]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "day,proportion\n0,0.25\n1,0.5\n"
        );
    }

    #[test]
    fn immunized_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("immunized.csv");
        write_immunized(&path, &["1098".to_string(), "1193".to_string()]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "rank,id\n1,1098\n2,1193\n"
        );

        write_immunized(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "rank,id\n");
    }

    #[test]
    fn snapshots_csv() {
        let mut context = Context::new();
        context
            .load_contact_graph(ContactGraph::from_edges([("a", "b")]))
            .unwrap();
        context.commit_statuses(&[Infected, Susceptible]);
        context.record_snapshot(0).unwrap();
        context.commit_statuses(&[Infected, Infected]);
        context.record_snapshot(1).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshots.csv");
        let graph = context.contact_graph().unwrap();
        write_snapshots(&path, &graph, context.day_history().unwrap()).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "day,id,status\n0,a,infected\n0,b,susceptible\n1,a,infected\n1,b,infected\n"
        );
    }
}
