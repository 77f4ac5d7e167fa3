//! End-to-end tests for the in-memory stack.
//!
//! Each test wires real services to the memory adapter and the in-process
//! event bus, then checks what ends up stored and what gets published.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use daily_tracker_adapter_memory::{MemoryEntryCache, MemoryEventStore, MemoryRepository};
use daily_tracker_app::cache::CachedRepository;
use daily_tracker_app::event_bus::InProcessEventBus;
use daily_tracker_app::journal::Journal;
use daily_tracker_app::ports::{EntryReader, EventStore};
use daily_tracker_app::services::sleep_service::SleepService;
use daily_tracker_app::services::task_service::TaskService;
use daily_tracker_domain::category::TaskCategory;
use daily_tracker_domain::event::DomainEvent;
use daily_tracker_domain::id::{SleepEntryId, TaskEntryId};
use daily_tracker_domain::level::StressLevel;
use daily_tracker_domain::sleep_entry::SleepEntry;
use daily_tracker_domain::task_entry::TaskEntry;
use tokio::sync::broadcast;

const JOURNAL: &str = r#"
    [[task]]
    id = "2024-03-01/report"
    date = "2024-03-01"
    day = 1
    key_task = "Write the report"
    category = "work"
    stress_before = 8
    started_at = "09:00"
    active_minutes = 90

    [[task]]
    id = "2024-03-02/run"
    date = "2024-03-02"
    day = 2
    key_task = "Morning run"
    category = "Health"
    stress_before = 5
    stress_after = 2

    [[sleep]]
    id = "2024-03-01/night"
    date = "2024-03-01"
    bedtime = "23:30"
    wake_time = "07:00"
    quality = 8
    latency_minutes = 15
"#;

type Tasks = TaskService<Arc<MemoryRepository<TaskEntry>>, Arc<InProcessEventBus>>;
type Nights = SleepService<
    CachedRepository<Arc<MemoryRepository<SleepEntry>>, MemoryEntryCache<SleepEntry>>,
    Arc<InProcessEventBus>,
>;

struct Stack {
    tasks: Tasks,
    nights: Nights,
    task_repo: Arc<MemoryRepository<TaskEntry>>,
    events: broadcast::Receiver<DomainEvent>,
}

fn stack() -> Stack {
    let bus = Arc::new(InProcessEventBus::new(64));
    let events = bus.subscribe();
    let task_repo = Arc::new(MemoryRepository::new());
    let sleep_repo = CachedRepository::new(
        Arc::new(MemoryRepository::new()),
        MemoryEntryCache::new(),
        TimeDelta::minutes(5),
    );

    Stack {
        tasks: TaskService::new(Arc::clone(&task_repo), Arc::clone(&bus)),
        nights: SleepService::new(sleep_repo, bus),
        task_repo,
        events,
    }
}

fn drain(rx: &mut broadcast::Receiver<DomainEvent>) -> Vec<DomainEvent> {
    let mut received = Vec::new();
    while let Ok(event) = rx.try_recv() {
        received.push(event);
    }
    received
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

async fn import(stack: &Stack) {
    let journal: Journal = toml::from_str(JOURNAL).unwrap();
    for row in journal.tasks {
        stack.tasks.create_task(row.into_entry().unwrap()).await.unwrap();
    }
    for row in journal.nights {
        stack.nights.log_sleep(row.into_entry().unwrap()).await.unwrap();
    }
}

#[tokio::test]
async fn should_publish_buffered_events_when_journal_imported() {
    let mut stack = stack();
    import(&stack).await;

    let types: Vec<_> = drain(&mut stack.events)
        .iter()
        .map(DomainEvent::event_type)
        .collect();
    assert_eq!(
        types,
        [
            "TaskStarted",
            "StressLevelChanged",
            "SleepEntryCreated",
            "SleepLatencyChanged"
        ]
    );
}

#[tokio::test]
async fn should_store_imported_entries_without_events() {
    let stack = stack();
    import(&stack).await;

    let report = stack
        .tasks
        .get_task(&TaskEntryId::new("2024-03-01/report"))
        .await
        .unwrap();
    assert!(report.is_started());
    assert_eq!(report.active_duration(), TimeDelta::minutes(90));

    let night = stack
        .nights
        .get_sleep(&SleepEntryId::new("2024-03-01/night"))
        .await
        .unwrap();
    assert!((night.total_sleep_hours() - 7.5).abs() < 1e-9);
    assert_eq!(night.sleep_latency(), TimeDelta::minutes(15));
    assert!(night.is_sleep_healthy());

    assert_eq!(stack.task_repo.len().unwrap(), 2);
    assert_eq!(stack.task_repo.find_by_date(date(2)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn should_summarize_tasks_over_range() {
    let stack = stack();
    import(&stack).await;

    let id = TaskEntryId::new("2024-03-01/report");
    stack
        .tasks
        .record_stress_after(&id, StressLevel::new(4).unwrap())
        .await
        .unwrap();

    let summary = stack.tasks.summary(date(1), date(31)).await.unwrap();
    assert_eq!(summary.per_category.get(&TaskCategory::Work), Some(&1));
    assert_eq!(summary.per_category.get(&TaskCategory::Health), Some(&1));
    assert!((summary.average_stress_reduction - 3.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn should_keep_event_log_per_aggregate() {
    let mut stack = stack();
    import(&stack).await;

    let night = SleepEntryId::new("2024-03-01/night");
    for _ in 0..3 {
        stack.nights.record_night_awakening(&night).await.unwrap();
    }

    let store = MemoryEventStore::new();
    for event in drain(&mut stack.events) {
        store.append(event).await.unwrap();
    }

    let latest = store.find_by_aggregate(night.as_str(), 2).await.unwrap();
    let types: Vec<_> = latest.iter().map(DomainEvent::event_type).collect();
    assert_eq!(types, ["PoorSleepQualityDetected", "NightAwakeningRecorded"]);

    let poor = store
        .find_by_type("PoorSleepQualityDetected", 10)
        .await
        .unwrap();
    assert_eq!(poor.len(), 1);

    let updated = stack.nights.get_sleep(&night).await.unwrap();
    assert_eq!(updated.night_awakenings(), 3);
    assert!(!updated.is_sleep_healthy());
}

#[tokio::test]
async fn should_reject_reimport_of_same_ids() {
    let stack = stack();
    import(&stack).await;

    let journal: Journal = toml::from_str(JOURNAL).unwrap();
    let row = journal.tasks.into_iter().next().unwrap();
    let err = stack
        .tasks
        .create_task(row.into_entry().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_ID");
}

#[tokio::test]
async fn should_restore_backup_without_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let tasks_path = dir.path().join("tasks.json");
    let sleep_path = dir.path().join("sleep.json");

    let source = stack();
    import(&source).await;
    assert_eq!(source.tasks.backup(&tasks_path).await.unwrap(), 2);
    assert_eq!(source.nights.backup(&sleep_path).await.unwrap(), 1);

    let mut target = stack();
    assert_eq!(target.tasks.restore(&tasks_path).await.unwrap(), 2);
    assert_eq!(target.nights.restore(&sleep_path).await.unwrap(), 1);
    assert!(drain(&mut target.events).is_empty());

    let night = target
        .nights
        .get_sleep(&SleepEntryId::new("2024-03-01/night"))
        .await
        .unwrap();
    assert_eq!(night.sleep_latency(), TimeDelta::minutes(15));
    assert!((night.total_sleep_hours() - 7.5).abs() < 1e-9);

    let summary = target.tasks.summary(date(1), date(31)).await.unwrap();
    assert_eq!(summary.per_category.get(&TaskCategory::Health), Some(&1));
}
