//! The front-end-held student list and every action that reconciles it with the remote collection.
//!
//! Fetches (`refresh`/`search`) rebuild the list wholesale and are sequence-numbered: a response is only
//! applied while its ticket is the newest one handed out, so a slow, superseded request can never
//! overwrite a newer result. Creates and updates force a full resync; deletes patch the list in place.

use crate::{
    client::StudentApi,
    data::student::{Student, StudentDraft, StudentPatch},
    error::{RegistrarError, RegistrarResult},
    notify::Notifier,
};
use reqwest::StatusCode;
use std::collections::HashSet;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterState {
    pub records: Vec<Student>,
    pub loading: bool,
    pub editing: Option<Student>,
    pub search_term: String,
    issued: u64,
}

impl RosterState {
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    pub const fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Replaces `records` if `ticket` is still the newest fetch. Returns whether it was applied.
    pub fn apply_listing(&mut self, ticket: FetchTicket, records: Vec<Student>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let mut seen = HashSet::with_capacity(records.len());
        self.records = records
            .into_iter()
            .filter(|student| seen.insert(student.id))
            .collect();
        self.loading = false;
        true
    }

    /// Ends a failed fetch. Searches blank the list, refreshes keep whatever was there.
    pub fn apply_failure(&mut self, ticket: FetchTicket, clear_records: bool) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        if clear_records {
            self.records.clear();
        }
        self.loading = false;
        true
    }

    pub fn remove_local(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|student| student.id != id);
        self.records.len() != before
    }

    pub fn find(&self, id: i64) -> Option<&Student> {
        self.records.iter().find(|student| student.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Refresh,
    Search,
}

pub struct SyncController<A> {
    api: A,
    state: Mutex<RosterState>,
    notifier: Notifier,
}

impl<A: StudentApi> SyncController<A> {
    pub fn new(api: A, notifier: Notifier) -> Self {
        Self {
            api,
            state: Mutex::new(RosterState::default()),
            notifier,
        }
    }

    pub async fn snapshot(&self) -> RosterState {
        self.state.lock().await.clone()
    }

    pub async fn editing(&self) -> Option<Student> {
        self.state.lock().await.editing.clone()
    }

    pub async fn find(&self, id: i64) -> Option<Student> {
        self.state.lock().await.find(id).cloned()
    }

    /// The held copy of a record, falling back to the server for ids the current list doesn't show.
    pub async fn lookup(&self, id: i64) -> RegistrarResult<Option<Student>> {
        if let Some(found) = self.find(id).await {
            return Ok(Some(found));
        }

        match self.api.get(id).await {
            Err(RegistrarError::Remote { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            other => other,
        }
    }

    pub async fn refresh(&self) {
        let ticket = self.state.lock().await.begin_fetch();
        let result = self.api.list().await;
        self.finish_fetch(ticket, FetchKind::Refresh, result).await;
    }

    pub async fn search(&self, term: &str) {
        self.state.lock().await.search_term = term.to_string();

        let term = term.trim();
        if term.is_empty() {
            self.refresh().await;
            return;
        }

        let ticket = self.state.lock().await.begin_fetch();
        let result = self.api.search(term).await;
        self.finish_fetch(ticket, FetchKind::Search, result).await;
    }

    pub async fn clear_search(&self) {
        self.state.lock().await.search_term.clear();
        self.refresh().await;
    }

    async fn finish_fetch(
        &self,
        ticket: FetchTicket,
        kind: FetchKind,
        result: RegistrarResult<Vec<Student>>,
    ) {
        let mut state = self.state.lock().await;
        match result {
            Ok(records) => {
                if state.apply_listing(ticket, records) {
                    drop(state);
                    self.notifier.roster_changed();
                } else {
                    debug!(?ticket, ?kind, "Discarding superseded listing");
                }
            }
            Err(e) => {
                if !state.apply_failure(ticket, kind == FetchKind::Search) {
                    debug!(?ticket, ?kind, ?e, "Discarding superseded failure");
                    return;
                }
                drop(state);

                match kind {
                    FetchKind::Refresh => {
                        error!(?e, "Error fetching students");
                        self.notifier.error(format!("Failed to fetch students: {e}"));
                    }
                    FetchKind::Search => {
                        error!(?e, "Error searching students");
                        self.notifier.error(format!("Failed to search students: {e}"));
                        self.notifier.roster_changed();
                    }
                }
            }
        }
    }

    /// Creates, or updates the record being edited. Errors go back to the caller so a form can keep its draft.
    pub async fn save(&self, draft: StudentDraft) -> RegistrarResult<()> {
        draft.ensure_complete()?;

        let editing_id = self.state.lock().await.editing.as_ref().map(|s| s.id);
        let result = match editing_id {
            Some(id) => self
                .api
                .update(id, &StudentPatch::from(draft))
                .await
                .map(|_| "Student updated successfully"),
            None => self
                .api
                .create(&draft)
                .await
                .map(|_| "Student created successfully"),
        };

        match result {
            Ok(message) => {
                {
                    //another tab may have started editing something else while this save ran
                    let mut state = self.state.lock().await;
                    if state.editing.as_ref().map(|s| s.id) == editing_id {
                        state.editing = None;
                    }
                }
                self.notifier.success(message);
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!(?e, ?editing_id, "Error saving student");
                self.notifier.error(format!("Failed to save student: {e}"));
                Err(e)
            }
        }
    }

    /// Updates one specific record, whatever is being edited in the main form.
    pub async fn update(&self, id: i64, patch: StudentPatch) -> RegistrarResult<()> {
        match self.api.update(id, &patch).await {
            Ok(_) => {
                self.notifier.success("Student updated successfully");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                error!(?e, id, "Error updating student");
                self.notifier.error(format!("Failed to update student: {e}"));
                Err(e)
            }
        }
    }

    pub async fn remove(&self, id: i64) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                self.state.lock().await.remove_local(id);
                self.notifier.success("Student deleted successfully!");
                self.notifier.roster_changed();
                true
            }
            Err(e) => {
                error!(?e, id, "Error deleting student");
                self.notifier.error(e.to_string());
                false
            }
        }
    }

    pub async fn begin_edit(&self, student: Student) {
        self.state.lock().await.editing = Some(student);
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.editing = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        notify::{FeedEvent, Toast, ToastKind, drain},
        test_support::student,
    };
    use std::sync::{
        Arc, Mutex as StdMutex,
        atomic::{AtomicBool, Ordering},
    };
    use tokio::sync::RwLock;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        List,
        Search(String),
        Get(i64),
        Create(StudentDraft),
        Update(i64, StudentPatch),
        Delete(i64),
    }

    /// Records calls and answers from an in-memory list.
    #[derive(Default)]
    struct ScriptedApi {
        students: StdMutex<Vec<Student>>,
        calls: StdMutex<Vec<Call>>,
        failing: AtomicBool,
        /// Creates wait on a read lock, so holding the write side parks them mid-request.
        write_gate: RwLock<()>,
    }

    impl ScriptedApi {
        fn with(students: Vec<Student>) -> Self {
            Self {
                students: StdMutex::new(students),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn answer(&self, call: Call) -> RegistrarResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.failing.load(Ordering::SeqCst) {
                return Err(RegistrarError::Remote {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "backend down".into(),
                });
            }
            Ok(())
        }
    }

    impl StudentApi for ScriptedApi {
        async fn list(&self) -> RegistrarResult<Vec<Student>> {
            self.answer(Call::List)?;
            Ok(self.students.lock().unwrap().clone())
        }

        async fn search(&self, term: &str) -> RegistrarResult<Vec<Student>> {
            self.answer(Call::Search(term.to_string()))?;
            Ok(self
                .students
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.name.contains(term))
                .cloned()
                .collect())
        }

        async fn get(&self, id: i64) -> RegistrarResult<Option<Student>> {
            self.answer(Call::Get(id))?;
            self.students
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .map(Some)
                .ok_or_else(|| RegistrarError::Remote {
                    status: StatusCode::NOT_FOUND,
                    message: format!("Student {id} not found"),
                })
        }

        async fn create(&self, draft: &StudentDraft) -> RegistrarResult<Option<Student>> {
            self.answer(Call::Create(draft.clone()))?;
            let _gate = self.write_gate.read().await;
            let mut students = self.students.lock().unwrap();
            let created = Student {
                id: students.iter().map(|s| s.id).max().unwrap_or(0) + 1,
                name: draft.name.clone(),
                email: draft.email.clone(),
                phone: draft.phone.clone(),
            };
            students.push(created.clone());
            Ok(Some(created))
        }

        async fn update(&self, id: i64, patch: &StudentPatch) -> RegistrarResult<Option<Student>> {
            self.answer(Call::Update(id, patch.clone()))?;
            let mut students = self.students.lock().unwrap();
            let found = students.iter_mut().find(|s| s.id == id);
            Ok(found.map(|s| {
                if let Some(name) = &patch.name {
                    s.name = name.clone();
                }
                s.clone()
            }))
        }

        async fn delete(&self, id: i64) -> RegistrarResult<()> {
            self.answer(Call::Delete(id))?;
            self.students.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }
    }

    fn controller(students: Vec<Student>) -> (SyncController<ScriptedApi>, Notifier) {
        let notifier = Notifier::new();
        (
            SyncController::new(ScriptedApi::with(students), notifier.clone()),
            notifier,
        )
    }

    fn draft(name: &str, email: &str, phone: &str) -> StudentDraft {
        StudentDraft {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    fn errors(events: &[FeedEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                FeedEvent::Toast(Toast {
                    kind: ToastKind::Error,
                    message,
                }) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn refresh_mirrors_the_server_list() {
        let server = vec![student(1, "A")];
        let (controller, _) = controller(server.clone());

        controller.refresh().await;

        let state = controller.snapshot().await;
        assert_eq!(state.records, server);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn refresh_keeps_server_order() {
        let server = vec![student(3, "C"), student(1, "A"), student(2, "B")];
        let (controller, _) = controller(server.clone());

        controller.refresh().await;

        assert_eq!(controller.snapshot().await.records, server);
    }

    #[tokio::test]
    async fn failed_refresh_clears_loading_and_reports() {
        let (controller, notifier) = controller(vec![student(1, "A")]);
        let mut rx = notifier.subscribe();
        controller.api.set_failing(true);

        controller.refresh().await;

        assert!(!controller.snapshot().await.loading);
        let errors = errors(&drain(&mut rx));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to fetch students"));
    }

    #[tokio::test]
    async fn empty_search_is_a_refresh() {
        let (controller, _) = controller(vec![student(1, "A")]);

        controller.search("   ").await;

        assert_eq!(controller.api.calls(), vec![Call::List]);
        assert_eq!(controller.snapshot().await.records, vec![student(1, "A")]);
    }

    #[tokio::test]
    async fn search_with_no_hits_empties_the_list_quietly() {
        let (controller, notifier) = controller(vec![student(1, "A")]);
        controller.refresh().await;
        let mut rx = notifier.subscribe();

        controller.search("zzz").await;

        let state = controller.snapshot().await;
        assert!(state.records.is_empty());
        assert_eq!(state.search_term, "zzz");
        assert!(errors(&drain(&mut rx)).is_empty());
    }

    #[tokio::test]
    async fn failed_search_blanks_the_list_and_reports() {
        let (controller, notifier) = controller(vec![student(1, "A")]);
        controller.refresh().await;
        let mut rx = notifier.subscribe();
        controller.api.set_failing(true);

        controller.search("zzz").await;

        assert!(controller.snapshot().await.records.is_empty());
        let errors = errors(&drain(&mut rx));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to search students"));
    }

    #[tokio::test]
    async fn clearing_the_search_refetches_everything() {
        let (controller, _) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.search("A").await;

        controller.clear_search().await;

        let state = controller.snapshot().await;
        assert!(state.search_term.is_empty());
        assert_eq!(state.records.len(), 2);
    }

    #[tokio::test]
    async fn saving_without_an_edit_target_creates_once() {
        let (controller, _) = controller(vec![student(1, "A")]);
        controller.refresh().await;

        controller
            .save(draft("B", "b@x.com", "2"))
            .await
            .unwrap();

        let calls = controller.api.calls();
        assert_eq!(
            calls,
            vec![
                Call::List,
                Call::Create(draft("B", "b@x.com", "2")),
                Call::List
            ]
        );
        let ids: Vec<_> = controller.snapshot().await.records.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn saving_while_editing_updates_that_record_once() {
        let (controller, _) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.refresh().await;
        controller.begin_edit(student(2, "B")).await;

        controller
            .save(draft("Bee", "b@x.com", "2"))
            .await
            .unwrap();

        let calls = controller.api.calls();
        assert_eq!(
            calls[1],
            Call::Update(2, StudentPatch::from(draft("Bee", "b@x.com", "2")))
        );
        assert!(!calls.iter().any(|c| matches!(c, Call::Create(_))));
        assert_eq!(controller.editing().await, None);
        assert_eq!(controller.find(2).await.unwrap().name, "Bee");
    }

    #[tokio::test]
    async fn an_edit_begun_during_a_create_survives_it() {
        let (controller, _) = controller(vec![student(1, "A")]);
        let controller = Arc::new(controller);
        let gate = controller.api.write_gate.write().await;

        let saving = tokio::spawn({
            let controller = controller.clone();
            async move { controller.save(draft("B", "b@x.com", "2")).await }
        });
        while !controller
            .api
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Create(_)))
        {
            tokio::task::yield_now().await;
        }
        controller.begin_edit(student(1, "A")).await;
        drop(gate);

        saving.await.unwrap().unwrap();
        assert_eq!(controller.editing().await, Some(student(1, "A")));
        assert_eq!(controller.snapshot().await.records.len(), 2);
    }

    #[tokio::test]
    async fn failed_save_keeps_the_edit_target() {
        let (controller, notifier) = controller(vec![student(1, "A")]);
        controller.begin_edit(student(1, "A")).await;
        let mut rx = notifier.subscribe();
        controller.api.set_failing(true);

        let result = controller.save(draft("A2", "a@x.com", "1")).await;

        assert!(matches!(result, Err(RegistrarError::Remote { .. })));
        assert_eq!(controller.editing().await, Some(student(1, "A")));
        assert_eq!(
            controller.api.calls(),
            vec![Call::Update(1, StudentPatch::from(draft("A2", "a@x.com", "1")))]
        );
        assert!(errors(&drain(&mut rx))[0].starts_with("Failed to save student"));
    }

    #[tokio::test]
    async fn incomplete_drafts_never_reach_the_server() {
        let (controller, _) = controller(vec![]);

        let result = controller.save(draft("A", "", "1")).await;

        assert!(matches!(
            result,
            Err(RegistrarError::MissingField { field: "email" })
        ));
        assert!(controller.api.calls().is_empty());
    }

    #[tokio::test]
    async fn overlay_updates_ignore_the_main_edit_target() {
        let (controller, _) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.begin_edit(student(1, "A")).await;

        controller
            .update(2, StudentPatch::from(draft("Bee", "b@x.com", "2")))
            .await
            .unwrap();

        assert_eq!(controller.editing().await, Some(student(1, "A")));
        assert_eq!(controller.find(2).await.unwrap().name, "Bee");
    }

    #[tokio::test]
    async fn remove_patches_locally_without_refetching() {
        let (controller, _) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.refresh().await;

        assert!(controller.remove(1).await);

        assert_eq!(controller.snapshot().await.records, vec![student(2, "B")]);
        assert_eq!(controller.api.calls(), vec![Call::List, Call::Delete(1)]);
    }

    #[tokio::test]
    async fn failed_remove_leaves_the_list_alone() {
        let (controller, notifier) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.refresh().await;
        let before = controller.snapshot().await.records;
        let mut rx = notifier.subscribe();
        controller.api.set_failing(true);

        assert!(!controller.remove(1).await);

        assert_eq!(controller.snapshot().await.records, before);
        assert_eq!(errors(&drain(&mut rx)).len(), 1);
    }

    #[tokio::test]
    async fn lookup_prefers_the_held_copy() {
        let (controller, _) = controller(vec![student(1, "A"), student(2, "B")]);
        controller.search("A").await;

        assert_eq!(controller.lookup(1).await.unwrap(), Some(student(1, "A")));
        assert_eq!(controller.lookup(2).await.unwrap(), Some(student(2, "B")));
        assert_eq!(controller.lookup(3).await.unwrap(), None);
        assert_eq!(
            controller.api.calls(),
            vec![Call::Search("A".into()), Call::Get(2), Call::Get(3)]
        );
    }

    #[tokio::test]
    async fn cancel_edit_clears_the_target() {
        let (controller, _) = controller(vec![]);
        controller.begin_edit(student(1, "A")).await;

        controller.cancel_edit().await;

        assert_eq!(controller.editing().await, None);
    }

    #[test]
    fn superseded_listings_are_discarded() {
        let mut state = RosterState::default();
        let older = state.begin_fetch();
        let newer = state.begin_fetch();

        assert!(state.apply_listing(newer, vec![student(2, "B")]));
        assert!(!state.apply_listing(older, vec![student(1, "A")]));
        assert!(!state.apply_failure(older, true));

        assert_eq!(state.records, vec![student(2, "B")]);
        assert!(!state.loading);
    }

    #[test]
    fn stale_responses_leave_loading_to_the_newest_fetch() {
        let mut state = RosterState::default();
        let older = state.begin_fetch();
        let _newer = state.begin_fetch();

        assert!(!state.apply_listing(older, vec![]));
        assert!(state.loading);
    }

    #[test]
    fn duplicate_ids_collapse_to_the_first() {
        let mut state = RosterState::default();
        let ticket = state.begin_fetch();

        state.apply_listing(
            ticket,
            vec![student(1, "A"), student(1, "Again"), student(2, "B")],
        );

        assert_eq!(state.records, vec![student(1, "A"), student(2, "B")]);
    }

    #[test]
    fn removing_an_unknown_id_changes_nothing() {
        let mut state = RosterState {
            records: vec![student(1, "A")],
            ..RosterState::default()
        };

        assert!(!state.remove_local(9));
        assert_eq!(state.records, vec![student(1, "A")]);
    }
}
