//! Journal import: feeds parsed rows through the services.

use chrono::NaiveDate;

use daily_tracker_app::journal::Journal;
use daily_tracker_app::ports::{EntryRepository, EventPublisher, TaskStatistics};
use daily_tracker_app::services::sleep_service::SleepService;
use daily_tracker_app::services::task_service::{TaskService, TaskSummary};
use daily_tracker_domain::error::TrackerError;
use daily_tracker_domain::sleep_entry::SleepEntry;
use daily_tracker_domain::task_entry::TaskEntry;

/// Outcome of a journal import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub tasks: usize,
    pub nights: usize,
    pub rejected: usize,
}

impl ImportReport {
    fn reject(&mut self, kind: &'static str, id: &str, err: &TrackerError) {
        self.rejected += 1;
        tracing::warn!(kind, id, code = err.code(), error = %err, "row rejected");
    }
}

/// Import every row; a bad row is logged and skipped.
pub async fn import<TR, SR, P>(
    journal: Journal,
    tasks: &TaskService<TR, P>,
    nights: &SleepService<SR, P>,
) -> ImportReport
where
    TR: EntryRepository<TaskEntry>,
    SR: EntryRepository<SleepEntry>,
    P: EventPublisher,
{
    let mut report = ImportReport::default();

    for row in journal.tasks {
        let id = row.id.clone();
        let outcome = match row.into_entry() {
            Ok(entry) => tasks.create_task(entry).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => report.tasks += 1,
            Err(err) => report.reject("task", &id, &err),
        }
    }

    for row in journal.nights {
        let id = row.id.clone();
        let outcome = match row.into_entry() {
            Ok(entry) => nights.log_sleep(entry).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(_) => report.nights += 1,
            Err(err) => report.reject("sleep", &id, &err),
        }
    }

    report
}

/// Figures over everything stored so far.
#[derive(Debug)]
pub struct Overview {
    pub tasks: TaskSummary,
    pub healthy_nights: usize,
    pub total_nights: usize,
}

/// # Errors
///
/// Returns a storage error propagated from the repositories.
pub async fn overview<TR, SR, P>(
    tasks: &TaskService<TR, P>,
    nights: &SleepService<SR, P>,
) -> Result<Overview, TrackerError>
where
    TR: EntryRepository<TaskEntry> + TaskStatistics,
    SR: EntryRepository<SleepEntry>,
    P: EventPublisher,
{
    let all_nights = nights.sleep_between(NaiveDate::MIN, NaiveDate::MAX).await?;
    Ok(Overview {
        tasks: tasks.summary(NaiveDate::MIN, NaiveDate::MAX).await?,
        healthy_nights: all_nights.iter().filter(|n| n.is_sleep_healthy()).count(),
        total_nights: all_nights.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use daily_tracker_adapter_memory::MemoryRepository;
    use daily_tracker_app::event_bus::InProcessEventBus;
    use daily_tracker_domain::category::TaskCategory;
    use daily_tracker_domain::id::TaskEntryId;

    use super::*;

    const JOURNAL: &str = r#"
        [[task]]
        id = "t-1"
        date = "2024-03-01"
        day = 1
        key_task = "Ship the release"
        category = "work"
        stress_before = 9
        stress_after = 4

        [[task]]
        id = "t-bad"
        date = "2024-03-02"
        day = 2
        key_task = "Tidy up"
        category = "chores"
        stress_before = 3

        [[sleep]]
        id = "n-1"
        date = "2024-03-01"
        bedtime = "22:45"
        wake_time = "06:30"
        quality = 9

        [[sleep]]
        id = "n-2"
        date = "2024-03-02"
        bedtime = "01:30"
        wake_time = "06:00"
        quality = 4

        [[sleep]]
        id = "n-bad"
        date = "2024-03-03"
        bedtime = "late"
        wake_time = "07:00"
        quality = 5
    "#;

    type Tasks = TaskService<MemoryRepository<TaskEntry>, Arc<InProcessEventBus>>;
    type Nights = SleepService<MemoryRepository<SleepEntry>, Arc<InProcessEventBus>>;

    fn services() -> (Tasks, Nights) {
        let bus = Arc::new(InProcessEventBus::new(16));
        (
            TaskService::new(MemoryRepository::new(), Arc::clone(&bus)),
            SleepService::new(MemoryRepository::new(), bus),
        )
    }

    #[tokio::test]
    async fn should_skip_bad_rows_and_count_the_rest() {
        let (tasks, nights) = services();
        let journal: Journal = toml::from_str(JOURNAL).unwrap();

        let report = import(journal, &tasks, &nights).await;
        assert_eq!(
            report,
            ImportReport {
                tasks: 1,
                nights: 2,
                rejected: 2,
            }
        );
    }

    #[tokio::test]
    async fn should_import_remaining_rows_when_a_count_is_negative() {
        let (tasks, nights) = services();
        let journal: Journal = toml::from_str(
            r#"
            [[task]]
            id = "t-1"
            date = "2024-03-01"
            day = 1
            key_task = "Ship the release"
            category = "work"
            stress_before = 6

            [[task]]
            id = "t-2"
            date = "2024-03-02"
            day = 2
            key_task = "Review notes"
            category = "study"
            stress_before = 4
            pomodoros = -1

            [[sleep]]
            id = "n-1"
            date = "2024-03-01"
            bedtime = "23:00"
            wake_time = "07:00"
            quality = 7
            awakenings = 200000
            "#,
        )
        .unwrap();

        let report = import(journal, &tasks, &nights).await;
        assert_eq!(
            report,
            ImportReport {
                tasks: 1,
                nights: 0,
                rejected: 2,
            }
        );
        assert!(tasks.get_task(&TaskEntryId::new("t-1")).await.is_ok());
    }

    #[tokio::test]
    async fn should_summarize_imported_entries() {
        let (tasks, nights) = services();
        let journal: Journal = toml::from_str(JOURNAL).unwrap();
        import(journal, &tasks, &nights).await;

        let overview = overview(&tasks, &nights).await.unwrap();
        assert_eq!(overview.total_nights, 2);
        assert_eq!(overview.healthy_nights, 1);
        assert_eq!(overview.tasks.per_category.get(&TaskCategory::Work), Some(&1));
        assert!((overview.tasks.average_stress_reduction - 5.0).abs() < f64::EPSILON);
    }
}
