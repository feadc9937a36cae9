use crate::types::ScheduledTask;
use archon_core::{ArchonError, ArchonResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Owns the set of recurring tasks and decides, per tick, which are due.
///
/// Firing uses catch-up semantics: however long the scheduler was paused, a
/// due task fires exactly once and its schedule resyncs to `now + interval`.
/// Missed intervals are never back-filled, so a pause cannot produce a
/// thundering-herd replay.
pub struct TaskScheduler {
    tasks: HashMap<String, ScheduledTask>,
    order: Vec<String>,
}

impl TaskScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a recurring task.
    ///
    /// Fails with [`ArchonError::DuplicateName`] if the name is taken and
    /// [`ArchonError::Config`] if the name is empty or the interval is zero.
    /// The target agent is deliberately not validated here — a dangling
    /// reference surfaces as a failed dispatch, not a registration error.
    pub fn add_task(&mut self, task: ScheduledTask) -> ArchonResult<()> {
        if task.name.is_empty() {
            return Err(ArchonError::Config("task name must be non-empty".into()));
        }
        if task.interval.is_zero() {
            return Err(ArchonError::Config(format!(
                "task '{}' has a zero interval",
                task.name
            )));
        }
        if self.tasks.contains_key(&task.name) {
            return Err(ArchonError::DuplicateName(task.name));
        }
        tracing::info!(
            task = %task.name,
            target = %task.target_agent,
            interval = ?task.interval,
            "task scheduled"
        );
        self.order.push(task.name.clone());
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    /// Remove a task by name.
    pub fn remove_task(&mut self, name: &str) -> ArchonResult<()> {
        if self.tasks.remove(name).is_none() {
            return Err(ArchonError::UnknownTask(name.to_string()));
        }
        self.order.retain(|n| n != name);
        Ok(())
    }

    /// Enable or disable a task.
    ///
    /// A disabled task's schedule does not advance; on re-enable it catches
    /// up once at the next tick.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> ArchonResult<()> {
        match self.tasks.get_mut(name) {
            Some(task) => {
                task.enabled = enabled;
                Ok(())
            }
            None => Err(ArchonError::UnknownTask(name.to_string())),
        }
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&ScheduledTask> {
        self.tasks.get(name)
    }

    /// Every task whose fire time has arrived as of `now`, earliest-due
    /// first, with each returned task's schedule advanced to
    /// `now + interval`.
    ///
    /// The ordering is a deterministic tie-break on the original
    /// `next_fire_at` (registration order for exact ties), so tests and
    /// replays are reproducible.
    pub fn due_tasks(&mut self, now: DateTime<Utc>) -> Vec<ScheduledTask> {
        let mut due: Vec<ScheduledTask> = self
            .order
            .iter()
            .filter_map(|n| self.tasks.get(n))
            .filter(|t| t.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|t| t.next_fire_at);

        for fired in &due {
            if let Some(task) = self.tasks.get_mut(&fired.name) {
                task.advance(now);
            }
        }
        due
    }

    /// Total number of tasks, enabled or not.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of enabled tasks not yet due as of `now`.
    pub fn pending_count(&self, now: DateTime<Utc>) -> usize {
        self.tasks
            .values()
            .filter(|t| t.enabled && !t.is_due(now))
            .count()
    }

    /// All tasks in registration order, for status reporting.
    pub fn all_tasks(&self) -> Vec<&ScheduledTask> {
        self.order.iter().filter_map(|n| self.tasks.get(n)).collect()
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use archon_core::TaskPayload;
    use std::time::Duration;

    fn task(name: &str, interval_secs: u64, target: &str) -> ScheduledTask {
        ScheduledTask::new(
            name,
            Duration::from_secs(interval_secs),
            target,
            TaskPayload::new("generate"),
        )
    }

    #[test]
    fn test_add_and_remove() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("daily_art", 86_400, "huraii")).unwrap();
        assert_eq!(scheduler.task_count(), 1);

        scheduler.remove_task("daily_art").unwrap();
        assert_eq!(scheduler.task_count(), 0);
        assert!(matches!(
            scheduler.remove_task("daily_art"),
            Err(ArchonError::UnknownTask(_))
        ));
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("daily_art", 86_400, "huraii")).unwrap();
        let err = scheduler.add_task(task("daily_art", 60, "cloe")).unwrap_err();
        assert!(matches!(err, ArchonError::DuplicateName(name) if name == "daily_art"));
        // Original registration untouched.
        assert_eq!(scheduler.get("daily_art").unwrap().target_agent, "huraii");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut scheduler = TaskScheduler::new();
        let err = scheduler.add_task(task("bad", 0, "huraii")).unwrap_err();
        assert!(matches!(err, ArchonError::Config(_)));
    }

    #[test]
    fn test_not_due_before_first_interval() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("sweep", 300, "cloe")).unwrap();
        assert!(scheduler.due_tasks(Utc::now()).is_empty());
    }

    #[test]
    fn test_catch_up_fires_once() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("sweep", 5, "cloe")).unwrap();

        // 42s later the 5s task is 37s overdue (7+ missed intervals).
        let now = Utc::now() + chrono::Duration::seconds(42);
        let due = scheduler.due_tasks(now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "sweep");

        // Exactly one fire, resynced to now + interval — no backlog replay.
        let next = scheduler.get("sweep").unwrap().next_fire_at;
        assert_eq!(next, now + chrono::Duration::seconds(5));
        assert!(scheduler.due_tasks(now).is_empty());
    }

    #[test]
    fn test_due_order_is_earliest_first() {
        let mut scheduler = TaskScheduler::new();
        // Registered A, B, C but due at t+1, t+3, t+2.
        scheduler.add_task(task("a", 1, "huraii")).unwrap();
        scheduler.add_task(task("b", 3, "huraii")).unwrap();
        scheduler.add_task(task("c", 2, "huraii")).unwrap();

        let now = Utc::now() + chrono::Duration::seconds(10);
        let names: Vec<String> = scheduler.due_tasks(now).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_pending_count_excludes_due_tasks() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("soon", 5, "cloe")).unwrap();
        scheduler.add_task(task("later", 3600, "horace")).unwrap();

        let now = Utc::now();
        assert_eq!(scheduler.pending_count(now), 2);

        // Once "soon" becomes due it is no longer pending; firing it resyncs
        // the schedule and it counts as pending again.
        let later = now + chrono::Duration::seconds(10);
        assert_eq!(scheduler.pending_count(later), 1);
        assert_eq!(scheduler.due_tasks(later).len(), 1);
        assert_eq!(scheduler.pending_count(later), 2);
    }

    #[test]
    fn test_disabled_task_skipped_without_advancing() {
        let mut scheduler = TaskScheduler::new();
        scheduler.add_task(task("sweep", 5, "cloe")).unwrap();
        scheduler.set_enabled("sweep", false).unwrap();

        let overdue = Utc::now() + chrono::Duration::seconds(60);
        assert!(scheduler.due_tasks(overdue).is_empty());
        assert_eq!(scheduler.pending_count(overdue), 0);

        // Re-enable: the task catches up exactly once at the next tick.
        scheduler.set_enabled("sweep", true).unwrap();
        let due = scheduler.due_tasks(overdue);
        assert_eq!(due.len(), 1);
        assert_eq!(
            scheduler.get("sweep").unwrap().next_fire_at,
            overdue + chrono::Duration::seconds(5)
        );
    }

    #[test]
    fn test_set_enabled_unknown_task() {
        let mut scheduler = TaskScheduler::new();
        assert!(matches!(
            scheduler.set_enabled("ghost", true),
            Err(ArchonError::UnknownTask(_))
        ));
    }
}
