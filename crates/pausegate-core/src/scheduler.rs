//! Scheduler subsystem. Runs keyed one-shot and recurring (cron) tasks.
//!
//! Tasks are identified by a key; scheduling a task under a key that is
//! already in use replaces the previous one. Tasks scheduled before
//! [`Scheduler::start`] is called are kept and spawned on start.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use croner::Cron;
use parking_lot::Mutex;
use std::{
	collections::HashMap,
	fmt::Debug,
	str::FromStr,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};
use tokio::task::JoinHandle;

use crate::prelude::*;

/// Cron schedule wrapper using the croner crate
#[derive(Debug, Clone)]
pub struct CronSchedule {
	expr: Box<str>,
	cron: Cron,
}

impl CronSchedule {
	/// Parse a cron expression (5 fields: minute hour day month weekday)
	pub fn parse(expr: &str) -> ClResult<Self> {
		let cron = Cron::from_str(expr)
			.map_err(|e| Error::ValidationError(format!("invalid cron expression: {}", e)))?;
		Ok(Self { expr: expr.into(), cron })
	}

	/// Calculate the next execution time strictly after the given timestamp
	pub fn next_execution(&self, after: Timestamp) -> ClResult<Timestamp> {
		let dt = DateTime::<Utc>::from_timestamp(after.0, 0).unwrap_or_else(Utc::now);

		self.cron
			.find_next_occurrence(&dt, false)
			.map(|next| Timestamp(next.timestamp()))
			.map_err(|e| {
				error!("Failed to find next cron occurrence for '{}': {}", self.expr, e);
				Error::ValidationError(format!("cron next_execution failed: {}", e))
			})
	}

	pub fn as_str(&self) -> &str {
		&self.expr
	}
}

impl PartialEq for CronSchedule {
	fn eq(&self, other: &Self) -> bool {
		self.expr == other.expr
	}
}

impl Eq for CronSchedule {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
	/// Run once at the given time (immediately if it already passed)
	At(Timestamp),
	/// Run on every occurrence of the expression
	Cron(CronSchedule),
}

#[async_trait]
pub trait Task<S: Clone>: Send + Sync + Debug {
	fn kind_of(&self) -> &'static str;
	async fn run(&self, state: &S) -> ClResult<()>;
}

struct Entry<S: Clone> {
	generation: u64,
	task: Arc<dyn Task<S>>,
	schedule: Schedule,
	handle: Option<JoinHandle<()>>,
}

// Scheduler
#[derive(Clone)]
pub struct Scheduler<S: Clone> {
	state: Arc<Mutex<Option<S>>>,
	tasks: Arc<Mutex<HashMap<Box<str>, Entry<S>>>>,
	generation: Arc<AtomicU64>,
}

impl<S: Clone> Debug for Scheduler<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let keys: Vec<Box<str>> = self.tasks.lock().keys().cloned().collect();
		f.debug_struct("Scheduler").field("tasks", &keys).finish_non_exhaustive()
	}
}

impl<S: Clone + Send + Sync + 'static> Scheduler<S> {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			state: Arc::new(Mutex::new(None)),
			tasks: Arc::new(Mutex::new(HashMap::new())),
			generation: Arc::new(AtomicU64::new(0)),
		})
	}

	/// Start executing tasks with the given state
	pub fn start(&self, state: S) {
		*self.state.lock() = Some(state.clone());

		let mut tasks = self.tasks.lock();
		for (key, entry) in tasks.iter_mut() {
			if entry.handle.is_none() {
				entry.handle = Some(self.spawn(
					key.clone(),
					entry.generation,
					entry.task.clone(),
					entry.schedule.clone(),
					state.clone(),
				));
			}
		}
		info!("Scheduler started with {} task(s)", tasks.len());
	}

	pub fn schedule_at(&self, key: &str, task: Arc<dyn Task<S>>, at: Timestamp) {
		self.schedule(key, task, Schedule::At(at));
	}

	pub fn schedule_cron(&self, key: &str, task: Arc<dyn Task<S>>, expr: &str) -> ClResult<()> {
		let cron = CronSchedule::parse(expr)?;
		self.schedule(key, task, Schedule::Cron(cron));
		Ok(())
	}

	/// Schedule a task, replacing any task already registered under `key`
	pub fn schedule(&self, key: &str, task: Arc<dyn Task<S>>, schedule: Schedule) {
		let generation = self.generation.fetch_add(1, Ordering::Relaxed);
		let state = self.state.lock().clone();

		let mut tasks = self.tasks.lock();
		let handle = state
			.map(|state| self.spawn(key.into(), generation, task.clone(), schedule.clone(), state));
		debug!("Scheduling task {} ({}): {:?}", key, task.kind_of(), schedule);

		let entry = Entry { generation, task, schedule, handle };
		if let Some(old) = tasks.insert(key.into(), entry) {
			if let Some(handle) = old.handle {
				handle.abort();
			}
		}
	}

	/// Remove a task. Returns `true` if one was registered under `key`.
	pub fn cancel(&self, key: &str) -> bool {
		let Some(entry) = self.tasks.lock().remove(key) else {
			return false;
		};
		if let Some(handle) = entry.handle {
			handle.abort();
		}
		debug!("Cancelled task {}", key);
		true
	}

	pub fn is_scheduled(&self, key: &str) -> bool {
		self.tasks.lock().contains_key(key)
	}

	pub fn schedule_of(&self, key: &str) -> Option<Schedule> {
		self.tasks.lock().get(key).map(|entry| entry.schedule.clone())
	}

	/// Abort every task and release the state
	pub fn shutdown(&self) {
		let mut tasks = self.tasks.lock();
		for (_, entry) in tasks.drain() {
			if let Some(handle) = entry.handle {
				handle.abort();
			}
		}
		*self.state.lock() = None;
		info!("Scheduler stopped");
	}

	fn spawn(
		&self,
		key: Box<str>,
		generation: u64,
		task: Arc<dyn Task<S>>,
		schedule: Schedule,
		state: S,
	) -> JoinHandle<()> {
		let tasks = self.tasks.clone();

		tokio::spawn(async move {
			loop {
				let now = Timestamp::now();
				let next_at = match &schedule {
					Schedule::At(ts) => *ts,
					Schedule::Cron(cron) => match cron.next_execution(now) {
						Ok(ts) => ts,
						Err(_) => break,
					},
				};

				let wait = u64::try_from(next_at.0.saturating_sub(now.0)).unwrap_or_default();
				if wait > 0 {
					tokio::time::sleep(Duration::from_secs(wait)).await;
				}

				debug!("Running task {} ({})", key, task.kind_of());
				if let Err(err) = task.run(&state).await {
					warn!("Task {} ({}) failed: {}", key, task.kind_of(), err);
				}

				if matches!(schedule, Schedule::At(_)) {
					break;
				}
			}

			let mut tasks = tasks.lock();
			if tasks.get(&key).is_some_and(|entry| entry.generation == generation) {
				tasks.remove(&key);
			}
		})
	}
}


// vim: ts=4
