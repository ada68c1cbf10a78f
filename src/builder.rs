use crate::model::{HeartBeat, DEFAULT_BRANCH, UNSAVED_ENTITY};
use crate::project::Project;

/// Wall-clock seconds since the Unix epoch, millisecond precision.
pub fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

pub fn build(entity: Option<&str>, is_write: bool, project: &Project, now: f64) -> HeartBeat {
    let entity = match entity.map(str::trim) {
        Some(e) if !e.is_empty() => e.to_owned(),
        _ => UNSAVED_ENTITY.to_owned(),
    };
    let branch = project.branch.clone().unwrap_or_else(|| DEFAULT_BRANCH.to_owned());

    HeartBeat::new(entity, now, project.name.clone(), branch, is_write)
}
