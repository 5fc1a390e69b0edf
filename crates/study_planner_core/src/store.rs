//! crates/study_planner_core/src/store.rs
//!
//! The process-wide reactive store holding exams, derived study sessions,
//! and the most recently generated study plan. The UI layer observes it
//! through subscriptions and mutates it through the operations below; a
//! projection of its state is persisted through the `SnapshotStore` port
//! after every mutation that touches persisted fields.

use std::sync::Arc;

use chrono::{Days, Local, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Exam, ExamDraft, ExamUpdate, PlanModule, StudySession};
use crate::ports::{SnapshotStore, StoreSnapshot};

/// Number of study sessions generated per exam.
const SESSIONS_PER_EXAM: u32 = 3;

/// Fixed time window of every generated session: 09:00-11:00, two hours.
const SESSION_DURATION_HOURS: u32 = 2;

fn session_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time")
}

fn session_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 0, 0).expect("11:00 is a valid time")
}

/// Case-insensitive subject equality, matching how the UI compares
/// subject labels.
fn subject_matches(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

//=========================================================================================
// Store State and Subscriptions
//=========================================================================================

/// The full in-memory state of the store. Each mutation replaces the whole
/// snapshot, so subscribers only ever observe fully-applied transitions.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub exams: Vec<Exam>,
    pub sessions: Vec<StudySession>,
    pub plan: Vec<PlanModule>,
}

/// Handle returned by [`StudyPlanStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreState) + Send>;

//=========================================================================================
// The Store
//=========================================================================================

/// The single application-state container.
///
/// Explicitly constructed and handed to the UI layer at startup rather than
/// living in a global; one instance per process is the single writer over
/// its collections. All operations run synchronously to completion on the
/// caller's thread, and subscribers are notified inline before the
/// operation returns.
pub struct StudyPlanStore {
    state: StoreState,
    snapshots: Arc<dyn SnapshotStore>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl StudyPlanStore {
    /// Creates a store rehydrated from the snapshot port.
    ///
    /// Exams and the plan are restored from the last written projection;
    /// sessions always start empty. A read failure degrades to empty
    /// defaults so the store stays usable in memory.
    pub fn new(snapshots: Arc<dyn SnapshotStore>) -> Self {
        let restored = match snapshots.read() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "failed to rehydrate snapshot, starting empty");
                StoreSnapshot::default()
            }
        };
        debug!(
            exams = restored.exams.len(),
            plan_modules = restored.plan.len(),
            "store rehydrated"
        );

        Self {
            state: StoreState {
                exams: restored.exams,
                sessions: Vec::new(),
                plan: restored.plan,
            },
            snapshots,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    //=====================================================================================
    // Subscriptions
    //=====================================================================================

    /// Registers a callback invoked synchronously with the fully-updated
    /// state after every committed mutation, in registration order.
    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&StoreState) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a previously registered subscriber. Returns `false` if the
    /// id was already removed or never existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    //=====================================================================================
    // Mutating Operations
    //=====================================================================================

    /// Adds a new exam. The store assigns the id; the new exam is visible
    /// to queries and subscribers before this call returns.
    pub fn add_exam(&mut self, draft: ExamDraft) {
        let mut next = self.state.clone();
        next.exams.push(draft.into_exam(Uuid::new_v4()));
        self.commit(next, true);
    }

    /// Replaces the named fields of the exam matching `id`. Silent no-op
    /// when the id is unknown.
    pub fn update_exam(&mut self, id: Uuid, update: &ExamUpdate) {
        let mut next = self.state.clone();
        let Some(exam) = next.exams.iter_mut().find(|exam| exam.id == id) else {
            debug!(%id, "update_exam: no matching exam");
            return;
        };
        update.apply_to(exam);
        self.commit(next, true);
    }

    /// Replaces the named fields of **every** exam whose subject matches
    /// case-insensitively. Multiple exams sharing one subject are all
    /// updated (fan-out, preserved behavioral contract). Silent no-op when
    /// nothing matches.
    pub fn update_exam_by_subject(&mut self, subject: &str, update: &ExamUpdate) {
        let mut next = self.state.clone();
        let mut matched = false;
        for exam in next
            .exams
            .iter_mut()
            .filter(|exam| subject_matches(&exam.subject, subject))
        {
            update.apply_to(exam);
            matched = true;
        }
        if !matched {
            debug!(subject, "update_exam_by_subject: no matching exam");
            return;
        }
        self.commit(next, true);
    }

    /// Deletes the exam matching `id`, cascading removal of all of its
    /// sessions in the same commit, and unconditionally clears the stored
    /// plan — the plan may reference the deleted exam and is treated as
    /// stale regardless. The plan is cleared even when the id is unknown,
    /// exactly as the delete has always behaved.
    pub fn delete_exam(&mut self, id: Uuid) {
        let mut next = self.state.clone();
        next.exams.retain(|exam| exam.id != id);
        next.sessions.retain(|session| session.exam_id != id);
        next.plan.clear();
        self.commit(next, true);
    }

    /// Discards the entire session collection and regenerates it from
    /// scratch: three sessions per current exam on consecutive calendar
    /// days starting today, each 09:00-11:00, incomplete, carrying the
    /// exam's subject. Not incremental: sessions from exams that no longer
    /// exist are unconditionally dropped.
    pub fn generate_sessions(&mut self) {
        let today = Local::now().date_naive();
        let mut next = self.state.clone();

        next.sessions = Vec::with_capacity(next.exams.len() * SESSIONS_PER_EXAM as usize);
        for exam in &next.exams {
            for day_offset in 0..SESSIONS_PER_EXAM {
                let date = today
                    .checked_add_days(Days::new(u64::from(day_offset)))
                    .unwrap_or(today);
                next.sessions.push(StudySession {
                    id: Uuid::new_v4(),
                    exam_id: exam.id,
                    date,
                    start_time: session_start_time(),
                    end_time: session_end_time(),
                    duration_hours: SESSION_DURATION_HOURS,
                    completed: false,
                    subject: exam.subject.clone(),
                });
            }
        }

        debug!(sessions = next.sessions.len(), "regenerated study sessions");
        // Sessions are excluded from the persisted projection, so the
        // snapshot does not change here.
        self.commit(next, false);
    }

    /// Flips the `completed` flag of the matching session. Silent no-op
    /// when the id is unknown.
    pub fn toggle_session_completion(&mut self, session_id: Uuid) {
        let mut next = self.state.clone();
        let Some(session) = next
            .sessions
            .iter_mut()
            .find(|session| session.id == session_id)
        else {
            debug!(%session_id, "toggle_session_completion: no matching session");
            return;
        };
        session.completed = !session.completed;
        self.commit(next, false);
    }

    /// Replaces the entire stored plan, wholesale.
    pub fn set_study_plan(&mut self, plan: Vec<PlanModule>) {
        let mut next = self.state.clone();
        next.plan = plan;
        self.commit(next, true);
    }

    //=====================================================================================
    // Queries (read-only)
    //=====================================================================================

    /// Sessions scheduled for today (process-local calendar date).
    pub fn today_sessions(&self) -> Vec<StudySession> {
        let today = Local::now().date_naive();
        self.state
            .sessions
            .iter()
            .filter(|session| session.date == today)
            .cloned()
            .collect()
    }

    /// The first exam whose subject matches case-insensitively.
    pub fn exam_by_subject(&self, subject: &str) -> Option<&Exam> {
        self.state
            .exams
            .iter()
            .find(|exam| subject_matches(&exam.subject, subject))
    }

    /// The current study plan, possibly empty.
    pub fn study_plan(&self) -> &[PlanModule] {
        &self.state.plan
    }

    /// Read access to the full state for the UI layer.
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn exams(&self) -> &[Exam] {
        &self.state.exams
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.state.sessions
    }

    //=====================================================================================
    // Commit
    //=====================================================================================

    /// Publishes a fully-applied state transition: swaps the state, notifies
    /// subscribers, then (for mutations touching persisted fields) writes
    /// the `{exams, plan}` projection through the snapshot port. A write
    /// failure is swallowed: the in-memory state stays authoritative for
    /// the remainder of the process.
    fn commit(&mut self, next: StoreState, persist: bool) {
        self.state = next;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
        if persist {
            let snapshot = StoreSnapshot {
                exams: self.state.exams.clone(),
                plan: self.state.plan.clone(),
            };
            if let Err(err) = self.snapshots.write(&snapshot) {
                warn!(error = %err, "snapshot write failed, continuing in memory only");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Difficulty;
    use crate::ports::{PortError, PortResult};

    /// In-memory snapshot store recording every write.
    #[derive(Default)]
    struct MemorySnapshots {
        slot: Mutex<Option<StoreSnapshot>>,
        writes: Mutex<u32>,
    }

    impl MemorySnapshots {
        fn write_count(&self) -> u32 {
            *self.writes.lock().unwrap()
        }

        fn last_written(&self) -> Option<StoreSnapshot> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl SnapshotStore for MemorySnapshots {
        fn write(&self, snapshot: &StoreSnapshot) -> PortResult<()> {
            *self.slot.lock().unwrap() = Some(snapshot.clone());
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }

        fn read(&self) -> PortResult<StoreSnapshot> {
            Ok(self.slot.lock().unwrap().clone().unwrap_or_default())
        }
    }

    /// Snapshot store whose medium is entirely unavailable.
    struct BrokenSnapshots;

    impl SnapshotStore for BrokenSnapshots {
        fn write(&self, _snapshot: &StoreSnapshot) -> PortResult<()> {
            Err(PortError::StorageUnavailable("quota exceeded".to_string()))
        }

        fn read(&self) -> PortResult<StoreSnapshot> {
            Err(PortError::StorageUnavailable("quota exceeded".to_string()))
        }
    }

    fn draft(subject: &str) -> ExamDraft {
        ExamDraft {
            subject: subject.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            difficulty: Difficulty::Medium,
            priority: Some(1),
            preferred_study_time: None,
            analysis: None,
            is_added: None,
        }
    }

    fn plan(module: &str) -> Vec<PlanModule> {
        vec![PlanModule {
            module: module.to_string(),
            explanation: format!("{module} explained"),
            youtube: "https://www.youtube.com/watch?v=abc".to_string(),
        }]
    }

    fn fresh_store() -> (StudyPlanStore, Arc<MemorySnapshots>) {
        let snapshots = Arc::new(MemorySnapshots::default());
        let store = StudyPlanStore::new(snapshots.clone());
        (store, snapshots)
    }

    #[test]
    fn add_exam_assigns_pairwise_distinct_ids() {
        let (mut store, _) = fresh_store();
        for i in 0..20 {
            store.add_exam(draft(&format!("Subject {i}")));
        }

        let ids: Vec<Uuid> = store.exams().iter().map(|exam| exam.id).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn delete_exam_cascades_to_sessions() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Applied Linear Algebra"));
        store.add_exam(draft("DSAA"));
        store.generate_sessions();

        let deleted = store.exam_by_subject("DSAA").unwrap().id;
        store.delete_exam(deleted);

        assert!(store.sessions().iter().all(|s| s.exam_id != deleted));
        assert!(store.today_sessions().iter().all(|s| s.exam_id != deleted));
        // The surviving exam's sessions are untouched.
        assert_eq!(store.sessions().len(), SESSIONS_PER_EXAM as usize);
    }

    #[test]
    fn delete_exam_clears_plan_even_for_unknown_id() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("DSAA"));
        store.set_study_plan(plan("DSAA"));

        store.delete_exam(Uuid::new_v4());

        assert_eq!(store.exams().len(), 1);
        assert!(store.study_plan().is_empty());
    }

    #[test]
    fn subject_lookup_is_case_insensitive() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Math"));

        assert!(store.exam_by_subject("math").is_some());
        assert!(store.exam_by_subject("MATH").is_some());
        assert!(store.exam_by_subject("physics").is_none());
    }

    #[test]
    fn update_by_subject_fans_out_to_all_matches() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Math"));
        store.add_exam(draft("MATH"));
        store.add_exam(draft("Physics"));

        let update = ExamUpdate {
            priority: Some(5),
            ..ExamUpdate::default()
        };
        store.update_exam_by_subject("math", &update);

        let priorities: Vec<Option<u32>> =
            store.exams().iter().map(|exam| exam.priority).collect();
        assert_eq!(priorities, vec![Some(5), Some(5), Some(1)]);
    }

    #[test]
    fn regeneration_is_destructive() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Math"));
        store.add_exam(draft("Physics"));

        store.generate_sessions();
        let first_ids: Vec<Uuid> = store.sessions().iter().map(|s| s.id).collect();
        store.generate_sessions();

        assert_eq!(store.sessions().len(), 2 * SESSIONS_PER_EXAM as usize);
        assert!(store
            .sessions()
            .iter()
            .all(|session| !first_ids.contains(&session.id)));
        assert!(store.sessions().iter().all(|session| !session.completed));
    }

    #[test]
    fn generated_sessions_copy_subject_and_time_window() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Math"));
        store.generate_sessions();

        let exam_id = store.exams()[0].id;
        for session in store.sessions() {
            assert_eq!(session.exam_id, exam_id);
            assert_eq!(session.subject, "Math");
            assert_eq!(session.start_time, session_start_time());
            assert_eq!(session.end_time, session_end_time());
            assert_eq!(session.duration_hours, SESSION_DURATION_HOURS);
        }
        // Three consecutive days starting today, so exactly one is today.
        assert_eq!(store.today_sessions().len(), 1);
    }

    #[test]
    fn toggle_twice_restores_completed() {
        let (mut store, _) = fresh_store();
        store.add_exam(draft("Math"));
        store.generate_sessions();

        let session_id = store.sessions()[0].id;
        store.toggle_session_completion(session_id);
        assert!(store.sessions()[0].completed);
        store.toggle_session_completion(session_id);
        assert!(!store.sessions()[0].completed);
    }

    #[test]
    fn plan_replacement_is_total() {
        let (mut store, _) = fresh_store();
        store.set_study_plan(plan("Stacks and Queues"));
        store.set_study_plan(plan("Trees and Graphs"));

        assert_eq!(store.study_plan(), plan("Trees and Graphs").as_slice());
    }

    #[test]
    fn persisted_projection_excludes_sessions() {
        let snapshots = Arc::new(MemorySnapshots::default());
        let mut store = StudyPlanStore::new(snapshots.clone());
        store.add_exam(draft("Math"));
        store.set_study_plan(plan("Math"));
        store.generate_sessions();

        // Simulated restart against the same slot.
        let restarted = StudyPlanStore::new(snapshots);
        assert_eq!(restarted.exams().len(), 1);
        assert_eq!(restarted.exams()[0].subject, "Math");
        assert_eq!(restarted.study_plan(), plan("Math").as_slice());
        assert!(restarted.sessions().is_empty());
    }

    #[test]
    fn session_only_mutations_do_not_write_snapshot() {
        let (mut store, snapshots) = fresh_store();
        store.add_exam(draft("Math"));
        let writes_after_add = snapshots.write_count();

        store.generate_sessions();
        let session_id = store.sessions()[0].id;
        store.toggle_session_completion(session_id);

        assert_eq!(snapshots.write_count(), writes_after_add);
    }

    #[test]
    fn lookup_misses_do_not_notify_or_persist() {
        let (mut store, snapshots) = fresh_store();
        store.add_exam(draft("Math"));
        let writes_before = snapshots.write_count();

        let notified = Arc::new(Mutex::new(0u32));
        let counter = notified.clone();
        store.subscribe(move |_| *counter.lock().unwrap() += 1);

        store.update_exam(Uuid::new_v4(), &ExamUpdate::default());
        store.update_exam_by_subject("unknown", &ExamUpdate::default());
        store.toggle_session_completion(Uuid::new_v4());

        assert_eq!(*notified.lock().unwrap(), 0);
        assert_eq!(snapshots.write_count(), writes_before);
    }

    #[test]
    fn subscribers_see_every_committed_state_in_order() {
        let (mut store, _) = fresh_store();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();
        let id = store.subscribe(move |state| sink.lock().unwrap().push(state.exams.len()));

        store.add_exam(draft("Math"));
        store.add_exam(draft("Physics"));
        store.delete_exam(store.exams()[0].id);
        assert_eq!(*observed.lock().unwrap(), vec![1, 2, 1]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_exam(draft("Chemistry"));
        assert_eq!(*observed.lock().unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn snapshot_write_receives_current_projection() {
        let (mut store, snapshots) = fresh_store();
        store.add_exam(draft("Math"));
        store.set_study_plan(plan("Math"));

        let written = snapshots.last_written().unwrap();
        assert_eq!(written.exams, store.exams());
        assert_eq!(written.plan, store.study_plan());
    }

    #[test]
    fn store_stays_usable_when_storage_is_unavailable() {
        let mut store = StudyPlanStore::new(Arc::new(BrokenSnapshots));
        store.add_exam(draft("Math"));
        store.generate_sessions();

        assert_eq!(store.exams().len(), 1);
        assert_eq!(store.sessions().len(), SESSIONS_PER_EXAM as usize);
    }
}
