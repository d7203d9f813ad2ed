//! End-to-end scenarios driving full machines through their public
//! surface: an alarm clock, a file upload, a persisted task, and the
//! error and cascade paths.

use std::sync::Arc;

use statecraft::core::subscriber;
use statecraft::persist::{bind, MemoryStore, PersistConfig};
use statecraft::{
    event_enum, machine_surface, state_enum, Event, Machine, MachineBuilder, MachineError,
    TransitionBuilder,
};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------
// Alarm clock
// ---------------------------------------------------------------------

state_enum! {
    pub enum ClockState {
        Clock,
        Bell,
        Alarm,
    }
}

event_enum! {
    pub enum ClockEvent {
        Tick,
        ClickH,
        ClickM,
        ClickMode,
        LongClickMode,
        ActivateAlarm,
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TimeOfDay {
    pub h: u32,
    pub m: u32,
}

impl TimeOfDay {
    fn advance(&mut self) {
        self.m += 1;
        if self.m == 60 {
            self.m = 0;
            self.h = (self.h + 1) % 24;
        }
    }
}

pub struct AlarmCtx {
    pub time: TimeOfDay,
    pub alarm: TimeOfDay,
    pub is_alarm_on: bool,
}

machine_surface! {
    pub struct AlarmClock for Machine<ClockState, ClockEvent, AlarmCtx> {
        events {
            tick / can_tick => Tick,
            click_h / can_click_h => ClickH,
            click_m / can_click_m => ClickM,
            click_mode / can_click_mode => ClickMode,
            long_click_mode / can_long_click_mode => LongClickMode,
            activate_alarm / can_activate_alarm => ActivateAlarm,
        }
        states {
            is_clock => Clock,
            is_bell => Bell,
            is_alarm => Alarm,
        }
    }
}

fn alarm_clock() -> AlarmClock {
    let machine: Machine<ClockState, ClockEvent, AlarmCtx> = MachineBuilder::new()
        .initial(ClockState::Clock)
        .context(AlarmCtx {
            time: TimeOfDay { h: 12, m: 0 },
            alarm: TimeOfDay { h: 6, m: 0 },
            is_alarm_on: false,
        })
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Clock)
                .on("Tick")
                .to(ClockState::Clock),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Alarm)
                .on("Tick")
                .to(ClockState::Alarm),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Bell)
                .on("Tick")
                .to(ClockState::Bell),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Clock)
                .on("LongClickMode")
                .to(ClockState::Alarm)
                .on_enter(|ctx: &mut statecraft::Context<AlarmCtx>, _event| {
                    ctx.data.is_alarm_on = true;
                    None
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Alarm)
                .on("ClickMode")
                .to(ClockState::Clock),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Alarm)
                .on("ClickH")
                .to(ClockState::Alarm)
                .on_enter(|ctx: &mut statecraft::Context<AlarmCtx>, _event| {
                    ctx.data.alarm.h = (ctx.data.alarm.h + 1) % 24;
                    None
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(ClockState::Alarm)
                .on("ClickM")
                .to(ClockState::Alarm)
                .on_enter(|ctx: &mut statecraft::Context<AlarmCtx>, _event| {
                    ctx.data.alarm.m = (ctx.data.alarm.m + 1) % 60;
                    None
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from_any([ClockState::Clock, ClockState::Alarm])
                .on("ActivateAlarm")
                .to(ClockState::Bell)
                .when(|ctx: &statecraft::Context<AlarmCtx>, _event| ctx.data.is_alarm_on),
        )
        .unwrap()
        .subscribe(
            "Tick",
            subscriber(|ctx: &mut statecraft::Context<AlarmCtx>, _event| {
                ctx.data.time.advance();
                None
            }),
        )
        .subscribe(
            "Tick",
            subscriber(|ctx: &mut statecraft::Context<AlarmCtx>, _event| {
                if ctx.data.is_alarm_on && ctx.data.time == ctx.data.alarm {
                    Some(ClockEvent::ActivateAlarm)
                } else {
                    None
                }
            }),
        )
        .build()
        .unwrap();
    AlarmClock::new(machine)
}

#[tokio::test]
async fn alarm_clock_stays_silent_without_arming() {
    let mut clock = alarm_clock();

    for _ in 0..18 * 60 {
        clock.tick().await.unwrap();
    }

    assert!(clock.is_clock());
    assert_eq!(clock.context().data.time, TimeOfDay { h: 6, m: 0 });
    assert_eq!(clock.history().len(), 18 * 60);
}

#[tokio::test]
async fn armed_alarm_clock_rings_when_time_matches() {
    let mut clock = alarm_clock();

    clock.long_click_mode().await.unwrap();
    assert!(clock.is_alarm());

    for _ in 0..18 * 60 {
        clock.tick().await.unwrap();
    }

    assert!(clock.is_bell());
    // LongClickMode + 1080 ticks + the follow-up ActivateAlarm.
    assert_eq!(clock.history().len(), 18 * 60 + 2);
    assert_eq!(
        clock.history().last().unwrap().event.name(),
        "ActivateAlarm"
    );
}

#[tokio::test]
async fn alarm_time_is_adjustable_in_alarm_mode() {
    let mut clock = alarm_clock();

    assert!(!clock.can_click_h().await.unwrap());
    clock.long_click_mode().await.unwrap();

    clock.click_h().await.unwrap();
    clock.click_m().await.unwrap();
    assert_eq!(clock.context().data.alarm, TimeOfDay { h: 7, m: 1 });

    clock.click_mode().await.unwrap();
    assert!(clock.is_clock());
}

// ---------------------------------------------------------------------
// File upload
// ---------------------------------------------------------------------

state_enum! {
    pub enum UploadState {
        Pending,
        Uploading,
        Completed,
        Failed,
    }
}

event_enum! {
    pub enum UploadEvent {
        Start,
        Finish { url: String },
        Fail,
    }
}

#[derive(Default)]
pub struct UploadCtx {
    pub url: Option<String>,
}

fn upload_machine(ctx: UploadCtx) -> Machine<UploadState, UploadEvent, UploadCtx> {
    MachineBuilder::new()
        .initial(UploadState::Pending)
        .context(ctx)
        .transition(
            TransitionBuilder::new()
                .from(UploadState::Pending)
                .on("Start")
                .to(UploadState::Uploading),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(UploadState::Uploading)
                .on("Finish")
                .to(UploadState::Completed)
                // Admit only when the incoming url differs from the one
                // already stored.
                .when(|ctx: &statecraft::Context<UploadCtx>, event| match event {
                    UploadEvent::Finish { url } => ctx.data.url.as_deref() != Some(url.as_str()),
                    _ => false,
                })
                .on_enter(|ctx, event| {
                    if let UploadEvent::Finish { url } = event {
                        ctx.data.url = Some(url.clone());
                    }
                    None
                }),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(UploadState::Uploading)
                .on("Fail")
                .to(UploadState::Failed),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn upload_completes_and_stores_the_url() {
    let mut machine = upload_machine(UploadCtx::default());

    machine.send(UploadEvent::Start).await.unwrap();
    machine
        .send(UploadEvent::Finish {
            url: "https://x".to_string(),
        })
        .await
        .unwrap();

    assert!(machine.is(&UploadState::Completed));
    assert_eq!(machine.context().data.url.as_deref(), Some("https://x"));
}

#[tokio::test]
async fn upload_rejects_an_unchanged_url() {
    let mut machine = upload_machine(UploadCtx {
        url: Some("https://x".to_string()),
    });

    machine.send(UploadEvent::Start).await.unwrap();
    let err = machine
        .send(UploadEvent::Finish {
            url: "https://x".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MachineError::GuardRejected { .. }));
    assert!(machine.is(&UploadState::Uploading));
}

#[tokio::test]
async fn upload_can_fail_midway() {
    let mut machine = upload_machine(UploadCtx::default());

    machine.send(UploadEvent::Start).await.unwrap();
    machine.send(UploadEvent::Fail).await.unwrap();

    assert!(machine.is(&UploadState::Failed));
    assert!(machine.context().data.url.is_none());
}

// ---------------------------------------------------------------------
// Task with persistence adapter
// ---------------------------------------------------------------------

state_enum! {
    pub enum TaskState {
        Inactive,
        Active,
        Completed,
    }
}

event_enum! {
    pub enum TaskEvent {
        Activate { tags: Vec<String> },
        Complete,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tag {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct TaskRecord {
    pub status: String,
    pub tags: Vec<Tag>,
}

fn task_machine(record: Arc<Mutex<TaskRecord>>) -> Machine<TaskState, TaskEvent, ()> {
    let activate_record = Arc::clone(&record);
    let complete_record = Arc::clone(&record);
    let uppercase_record = Arc::clone(&record);

    MachineBuilder::new()
        .initial(TaskState::Inactive)
        .context(())
        .transition(
            TransitionBuilder::new()
                .from(TaskState::Inactive)
                .on("Activate")
                .to(TaskState::Active)
                .on_enter_async(statecraft::core::handler_async(
                    move |_ctx: &mut statecraft::Context<()>, event: &TaskEvent| {
                        let record = Arc::clone(&activate_record);
                        let tags = match event {
                            TaskEvent::Activate { tags } => tags.clone(),
                            _ => Vec::new(),
                        };
                        Box::pin(async move {
                            let mut record = record.lock().await;
                            record.status = "Active".to_string();
                            record.tags = tags.into_iter().map(|name| Tag { name }).collect();
                            Ok(None)
                        })
                    },
                )),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from(TaskState::Active)
                .on("Complete")
                .to(TaskState::Completed)
                .on_exit_async(statecraft::core::handler_async(
                    move |_ctx: &mut statecraft::Context<()>, _event: &TaskEvent| {
                        let record = Arc::clone(&uppercase_record);
                        Box::pin(async move {
                            let mut record = record.lock().await;
                            for tag in &mut record.tags {
                                tag.name = format!("{}-completed", tag.name.to_uppercase());
                            }
                            Ok(None)
                        })
                    },
                ))
                .on_enter_async(statecraft::core::handler_async(
                    move |_ctx: &mut statecraft::Context<()>, _event: &TaskEvent| {
                        let record = Arc::clone(&complete_record);
                        Box::pin(async move {
                            record.lock().await.status = "Completed".to_string();
                            Ok(None)
                        })
                    },
                )),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn task_lifecycle_persists_the_owning_record() {
    let record = Arc::new(Mutex::new(TaskRecord::default()));
    let store = Arc::new(MemoryStore::new());
    let mut machine = task_machine(Arc::clone(&record));

    bind(
        &mut machine,
        Arc::clone(&record),
        store.clone(),
        PersistConfig::default(),
    );

    machine
        .send(TaskEvent::Activate {
            tags: vec!["tag one".to_string(), "tag two".to_string()],
        })
        .await
        .unwrap();
    machine.send(TaskEvent::Complete).await.unwrap();

    assert!(machine.is(&TaskState::Completed));
    assert_eq!(store.save_count(), 2);

    let persisted = store.last().unwrap();
    assert_eq!(persisted.status, "Completed");
    let names: Vec<_> = persisted.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["TAG ONE-completed", "TAG TWO-completed"]);
}

// ---------------------------------------------------------------------
// Guard rejection, unknown events, nested cascade
// ---------------------------------------------------------------------

state_enum! {
    pub enum GateState {
        Shut,
        Open,
    }
}

event_enum! {
    pub enum GateEvent {
        Push,
        Knock,
    }
}

#[tokio::test]
async fn vetoed_gate_never_moves() {
    let mut machine = MachineBuilder::new()
        .initial(GateState::Shut)
        .context(())
        .transition(
            TransitionBuilder::new()
                .from(GateState::Shut)
                .on("Push")
                .to(GateState::Open)
                .when(|_ctx, _event| false),
        )
        .unwrap()
        .build()
        .unwrap();

    let err = machine.send(GateEvent::Push).await.unwrap_err();

    assert!(matches!(err, MachineError::GuardRejected { .. }));
    assert!(machine.is(&GateState::Shut));
    assert!(machine.history().is_empty());
}

#[tokio::test]
async fn unknown_event_leaves_subscribers_untouched() {
    let mut machine = MachineBuilder::new()
        .initial(GateState::Shut)
        .context(())
        .transition(
            TransitionBuilder::new()
                .from(GateState::Shut)
                .on("Push")
                .to(GateState::Open),
        )
        .unwrap()
        .subscribe("Push", subscriber(|_ctx, _event| None))
        .subscribe_once("Push", subscriber(|_ctx, _event| None))
        .build()
        .unwrap();

    let err = machine.send(GateEvent::Knock).await.unwrap_err();

    assert!(matches!(err, MachineError::UnknownEvent { .. }));
    assert_eq!(machine.subscriber_count("Push"), 2);
    assert!(machine.is(&GateState::Shut));
}

#[tokio::test]
async fn nested_cascade_drives_both_machines() {
    let child = MachineBuilder::new()
        .initial(GateState::Shut)
        .context(())
        .transition(
            TransitionBuilder::new()
                .from(GateState::Shut)
                .on("Push")
                .to(GateState::Open),
        )
        .unwrap()
        .build()
        .unwrap();

    let mut parent = MachineBuilder::new()
        .initial(GateState::Shut)
        .context(())
        .transition(
            TransitionBuilder::new()
                .from(GateState::Shut)
                .on("Push")
                .to(GateState::Open),
        )
        .unwrap()
        .child("inner", child)
        .build()
        .unwrap();

    parent.send(GateEvent::Push).await.unwrap();

    assert!(parent.is(&GateState::Open));
    assert_eq!(parent.history().len(), 1);
    assert_eq!(parent.children().count(), 1);

    let inner = parent.child("inner").unwrap();
    assert!(inner.is(&GateState::Open));
    assert_eq!(inner.history().len(), 1);
}
