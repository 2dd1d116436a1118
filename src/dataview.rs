//! The data view component: state store, backend and chart registry behind
//! one set of user actions.
//!
//! Each action runs its request to completion before returning, so the
//! component itself never sees overlapping responses. Hosts that overlap
//! requests drive [`DataViewState`]'s `begin_*` / `complete_*` pair directly.

use crate::api::client::Backend;
use crate::api::models::LoadSource;
use crate::config::Config;
use crate::data::cell_value::cell;
use crate::error::{DataViewError, PreconditionError, Result};
use crate::render::charts::{ChartRegistry, ChartUpdate, DistributionPass, Palette};
use crate::render::table::{build_body, build_table, BodyRow, TableModel};
use crate::render::{html, terminal};
use crate::state::{Completion, DataViewState, Refresh};
use tracing::{debug, info};

pub struct DataView<B: Backend> {
    config: Config,
    state: DataViewState,
    backend: B,
    charts: ChartRegistry,
    distributions: DistributionPass,
    notice: Option<String>,
}

impl<B: Backend> DataView<B> {
    pub fn new(config: Config, backend: B) -> Self {
        let state = DataViewState::new(&config.viewer);
        let charts = ChartRegistry::new(
            Palette::from(&config.theme),
            config.viewer.top_categories,
        );
        info!(
            target: "dataview",
            "DataView ready (page size {})",
            state.pagination().page_size
        );
        Self {
            config,
            state,
            backend,
            charts,
            distributions: DistributionPass::default(),
            notice: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &DataViewState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    /// The last per-column distribution pass, including its render errors.
    pub fn distributions(&self) -> &DistributionPass {
        &self.distributions
    }

    /// Inline message left by the last rejected action, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // ========== Actions ==========

    /// Upload or open a dataset. Replaces everything, including on failure.
    pub fn load_dataset(&mut self, source: LoadSource) -> Result<Completion> {
        self.notice = None;
        let ticket = self.state.begin_load();
        let result = self
            .backend
            .load(&source)
            .and_then(|response| response.into_parts(&source));
        let completion = self.state.complete_load(ticket, result);

        // A failed load empties the view, so its charts go too
        match &completion {
            Ok(Completion::Applied(refresh)) => self.refresh(*refresh),
            Ok(Completion::Discarded) => {}
            Err(_) => self.refresh(Refresh::All),
        }
        completion
    }

    /// Run `text` from page one.
    pub fn run_query(&mut self, text: &str) -> Result<Completion> {
        let (ticket, request) = match self.state.begin_query(text) {
            Ok(dispatch) => dispatch,
            Err(e) => return Err(self.reject(e)),
        };
        self.notice = None;
        let result = self.backend.query(&request);
        let completion = self.state.complete_query(ticket, result)?;
        self.apply(completion);
        Ok(completion)
    }

    /// Fetch rows for `page`; columns and charts are kept.
    pub fn go_to_page(&mut self, page: usize) -> Result<Completion> {
        let (ticket, request) = match self.state.begin_page(page) {
            Ok(dispatch) => dispatch,
            Err(e) => return Err(self.reject(e)),
        };
        self.notice = None;
        let result = self.backend.page(&request);
        let completion = self.state.complete_page(ticket, result)?;
        self.apply(completion);
        Ok(completion)
    }

    pub fn next_page(&mut self) -> Result<Completion> {
        let page = self.state.pagination().current_page + 1;
        self.go_to_page(page)
    }

    pub fn prev_page(&mut self) -> Result<Completion> {
        let page = self.state.pagination().current_page.saturating_sub(1);
        self.go_to_page(page)
    }

    /// Header click: cycle the sort on `column`. No request, no chart rebuild.
    pub fn set_sort(&mut self, column: &str) -> Result<Refresh> {
        match self.state.set_sort(column) {
            Ok(refresh) => {
                self.notice = None;
                self.refresh(refresh);
                Ok(refresh)
            }
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Pointer entered the cell at `row` (position in the displayed, sorted
    /// page) of `column`.
    pub fn hover_cell(&mut self, row: usize, column: &str) -> Option<ChartUpdate> {
        let value = {
            let rows = self.state.sorted_rows();
            cell(rows.get(row)?, column).clone()
        };
        self.charts.highlight(column, &value)
    }

    /// Pointer left a cell of `column`.
    pub fn leave_cell(&mut self, column: &str) -> Option<ChartUpdate> {
        self.charts.restore(column)
    }

    // ========== Rendering ==========

    pub fn table_model(&self) -> TableModel {
        let mut model = build_table(
            &self.state,
            &self.distributions,
            &self.config.theme.sort_glyphs,
        );
        model.notice = self.notice.clone();
        model
    }

    /// Body rows only, for the sort re-render.
    pub fn body(&self) -> Vec<BodyRow> {
        build_body(&self.state)
    }

    pub fn render_html(&self) -> String {
        html::render_document(&self.table_model(), &self.charts)
    }

    pub fn render_body_html(&self) -> String {
        html::render_body(&self.body())
    }

    pub fn render_terminal(&self) -> String {
        terminal::render_view(&self.table_model(), &self.charts)
    }

    // ========== Internals ==========

    fn reject(&mut self, error: PreconditionError) -> DataViewError {
        debug!(target: "dataview", "Rejected: {}", error);
        self.notice = Some(error.to_string());
        error.into()
    }

    fn apply(&mut self, completion: Completion) {
        if let Completion::Applied(refresh) = completion {
            self.refresh(refresh);
        }
    }

    fn refresh(&mut self, refresh: Refresh) {
        match refresh {
            Refresh::All => {
                self.distributions = self
                    .charts
                    .rebuild(self.state.columns(), self.state.distributions());
            }
            // Body-only refreshes read straight from state at render time
            Refresh::Page | Refresh::Sort => {}
        }
        debug!(target: "render", "Refresh {:?}", refresh);
    }
}
