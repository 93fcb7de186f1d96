//! View state and the controller driving it
//!
//! `ViewState` owns everything the list view needs (search term, last fetch,
//! derived display list, selection, loading flag) and only changes through
//! its transition methods. The display list is always
//! `filter_and_sort(fetched, search_term)`.

use super::association::{AssociationOrchestrator, AssociationOutcome};
use super::filter::filter_and_sort;
use super::gateway::{ReadOutcome, RecordGateway};
use super::models::Stakeholder;
use super::selection::SelectionTracker;

/// Identifies one load; a newer ticket supersedes older ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone)]
pub struct ViewState {
    search_term: String,
    fetched: Vec<Stakeholder>,
    display: Vec<Stakeholder>,
    selection: SelectionTracker,
    loading: bool,
    generation: u64,
    last_fetch_error: Option<String>,
}

impl ViewState {
    pub fn new(preserve_selection_on_empty_click: bool) -> Self {
        Self {
            search_term: String::new(),
            fetched: Vec::new(),
            display: Vec::new(),
            selection: SelectionTracker::new(preserve_selection_on_empty_click),
            // the view starts out waiting for its first load
            loading: true,
            generation: 0,
            last_fetch_error: None,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn fetched(&self) -> &[Stakeholder] {
        &self.fetched
    }

    pub fn display(&self) -> &[Stakeholder] {
        &self.display
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error swallowed by the last applied fetch, if any
    pub fn last_fetch_error(&self) -> Option<&str> {
        self.last_fetch_error.as_deref()
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn current_selection(&self) -> Vec<Stakeholder> {
        self.selection.current_selection(&self.display)
    }

    /// Recomputes the display list only when the term actually changed
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.search_term {
            return;
        }
        self.search_term = term;
        self.recompute();
    }

    /// Replace the fetched list wholesale
    pub fn set_fetched_list(&mut self, stakeholders: Vec<Stakeholder>) {
        self.fetched = stakeholders;
        self.recompute();
    }

    /// Replace the selected rows (positions in the display list)
    pub fn set_selection(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.selection.set_rows(rows, self.display.len());
    }

    pub fn toggle_row(&mut self, row: usize) {
        self.selection.toggle(row, self.display.len());
    }

    pub fn empty_area_click(&mut self) {
        self.selection.empty_area_click();
    }

    /// Start a load, superseding any load still in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket(self.generation)
    }

    /// Apply a finished load. Results of a superseded ticket are dropped and
    /// leave the loading flag to the newer load. Returns whether it applied.
    pub fn complete_load(&mut self, ticket: LoadTicket, outcome: ReadOutcome<Stakeholder>) -> bool {
        if ticket.0 != self.generation {
            log::debug!(
                "Discarding stale load {} (current is {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.last_fetch_error = outcome.error;
        self.set_fetched_list(outcome.records);
        self.loading = false;
        true
    }

    /// Mark busy outside a load (the association call)
    pub fn begin_busy(&mut self) {
        self.loading = true;
    }

    pub fn end_load(&mut self) {
        self.loading = false;
    }

    /// Back to defaults ahead of a full reload
    pub fn reset(&mut self) {
        self.search_term.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.display = filter_and_sort(&self.fetched, &self.search_term);
        self.selection.invalidate();
    }
}

/// Ties the view state to one parent record
pub struct LinkController {
    gateway: RecordGateway,
    orchestrator: AssociationOrchestrator,
    parent_id: String,
    state: ViewState,
}

impl LinkController {
    pub fn new(
        gateway: RecordGateway,
        orchestrator: AssociationOrchestrator,
        parent_id: impl Into<String>,
        preserve_selection_on_empty_click: bool,
    ) -> Self {
        Self {
            gateway,
            orchestrator,
            parent_id: parent_id.into(),
            state: ViewState::new(preserve_selection_on_empty_click),
        }
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    /// Fetch the unlinked stakeholders for the current parent
    pub async fn load(&mut self) -> &ViewState {
        let ticket = self.state.begin_load();
        let outcome = self.gateway.fetch_unlinked_stakeholders(&self.parent_id).await;
        self.state.complete_load(ticket, outcome);
        &self.state
    }

    /// Switch to another parent record and reload
    pub async fn set_parent(&mut self, parent_id: impl Into<String>) -> &ViewState {
        let parent_id = parent_id.into();
        if parent_id != self.parent_id {
            self.parent_id = parent_id;
            self.state.reset();
            self.load().await;
        }
        &self.state
    }

    /// Reset search and selection, then fetch again
    pub async fn reload(&mut self) -> &ViewState {
        self.state.reset();
        self.load().await
    }

    /// Link the current selection; on success the view is reloaded
    pub async fn associate_selected(&mut self) -> AssociationOutcome {
        let selection = self.state.current_selection();
        if selection.is_empty() {
            return self.orchestrator.associate_selected(&self.parent_id, &selection).await;
        }

        self.state.begin_busy();
        let outcome = self.orchestrator.associate_selected(&self.parent_id, &selection).await;
        self.state.end_load();

        if outcome.is_success() {
            self.reload().await;
        }
        outcome
    }
}
