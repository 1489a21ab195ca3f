//! The session controller.
//!
//! [`Session`] is the single owner of the live document and all view state
//! derived from it. Every operation takes `&mut self`, runs to completion and
//! leaves rows, matches and breadcrumbs consistent with the new document.

use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use crate::collapse::{container_paths, CollapseState};
use crate::config::Config;
use crate::confirm::{ConfirmGate, Press};
use crate::editor::{parse_editor_text, DiffPair};
use crate::error::{ParseError, Result, ValidationError};
use crate::flatten::{flatten, row_index_of, Row};
use crate::launch::{share_url, LaunchParams, ViewTab};
use crate::mutate::{self, default_document, empty_document, Direction, Mutation, PathEffect};
use crate::path::NodePath;
use crate::search::SearchState;
use crate::share::{ShareCodec, SharedDocuments};
use crate::store::BlobStore;
use crate::viewport::{breadcrumbs_at, offset_for_top, Crumb};

pub const NAVIGATION_PROMPT: &str = "Data will be lost if you leave the page.";

#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    document: Value,
    collapse: CollapseState,
    expand_all: bool,
    frozen: Option<Value>,
    search: SearchState,
    tab: ViewTab,
    unsaved: bool,
    scroll_offset: f64,
    crumbs: Vec<Crumb>,
    reset_gate: ConfirmGate,
    clear_gate: ConfirmGate,
    unfreeze_gate: ConfirmGate,
    delete_gate: ConfirmGate<NodePath>,
}

impl Session {
    /// Starts on the default document, frozen, every container collapsed.
    pub fn new(config: Config) -> Self {
        Self::with_document(config, default_document())
    }

    pub fn with_document(config: Config, document: Value) -> Self {
        let window = config.confirm.window();
        let mut session = Session {
            collapse: CollapseState::collapsed_all(&document),
            frozen: Some(document.clone()),
            document,
            expand_all: false,
            search: SearchState::default(),
            tab: ViewTab::default(),
            unsaved: false,
            scroll_offset: 0.0,
            crumbs: Vec::new(),
            reset_gate: ConfirmGate::new(window),
            clear_gate: ConfirmGate::new(window),
            unfreeze_gate: ConfirmGate::new(window),
            delete_gate: ConfirmGate::new(window),
            config,
        };
        session.refresh();
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn collapse_state(&self) -> &CollapseState {
        &self.collapse
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn frozen(&self) -> Option<&Value> {
        self.frozen.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn is_expand_all(&self) -> bool {
        self.expand_all
    }

    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn tab(&self) -> ViewTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ViewTab) {
        self.tab = tab;
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        flatten(&self.document, &self.collapse)
    }

    pub fn toggle_expand(&mut self, path: &NodePath) -> bool {
        let expanded = self.collapse.toggle(path);
        self.refresh();
        expanded
    }

    pub fn set_expand_all(&mut self, expand: bool) {
        self.expand_all = expand;
        if expand {
            self.collapse.expand_all();
        } else {
            self.collapse.collapse_all(&self.document);
        }
        self.refresh();
    }

    pub fn move_node(&mut self, path: &NodePath, direction: Direction) -> bool {
        match mutate::move_node(&self.document, path, direction) {
            Some(mutation) => {
                self.adopt(mutation);
                true
            }
            None => false,
        }
    }

    /// Deletes on the second press for the same row inside the window.
    pub fn delete_node(&mut self, path: &NodePath, now: Instant) -> Press {
        let press = self.delete_gate.press(path.clone(), now);
        if press == Press::Confirmed {
            match mutate::delete_node(&self.document, path) {
                Some(mutation) => self.adopt(mutation),
                None => debug!(%path, "delete confirmed for a missing node"),
            }
        }
        press
    }

    pub fn is_delete_armed(&self, path: &NodePath, now: Instant) -> bool {
        self.delete_gate.is_armed_for(path, now)
    }

    pub fn edit_node(
        &mut self,
        path: &NodePath,
        new_key: &str,
        raw_value: &str,
    ) -> Result<bool, ValidationError> {
        match mutate::edit_node(&self.document, path, new_key, raw_value)? {
            Some(mutation) => {
                self.adopt(mutation);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Adds a member or element under `target` and expands it so the new row
    /// shows.
    pub fn add_field(&mut self, target: &NodePath) -> bool {
        match mutate::add_field(&self.document, target) {
            Some(mutation) => {
                self.collapse.reveal(target);
                self.adopt(mutation);
                true
            }
            None => false,
        }
    }

    /// Restores the default document on the confirming press. Expand-all is
    /// switched off and every container starts collapsed.
    pub fn reset(&mut self, now: Instant) -> Press {
        let press = self.reset_gate.press((), now);
        if press == Press::Confirmed {
            let document = default_document();
            if self.frozen.is_some() {
                self.frozen = Some(document.clone());
            }
            self.expand_all = false;
            self.collapse = CollapseState::collapsed_all(&document);
            self.document = document;
            self.unsaved = false;
            self.refresh();
        }
        press
    }

    pub fn is_reset_armed(&self, now: Instant) -> bool {
        self.reset_gate.is_armed(now)
    }

    /// Empties the document on the confirming press.
    pub fn clear(&mut self, now: Instant) -> Press {
        let press = self.clear_gate.press((), now);
        if press == Press::Confirmed {
            self.adopt(Mutation {
                document: empty_document(),
                effect: PathEffect::None,
            });
        }
        press
    }

    pub fn is_clear_armed(&self, now: Instant) -> bool {
        self.clear_gate.is_armed(now)
    }

    /// Takes text from the editor. On a parse error the document stays as
    /// it was.
    pub fn apply_editor_text(&mut self, text: &str) -> Result<(), ParseError> {
        let next = parse_editor_text(text)?;
        // Map equality ignores key order; compare the text instead.
        if next.to_string() != self.document.to_string() {
            self.adopt(Mutation {
                document: next,
                effect: PathEffect::None,
            });
        }
        Ok(())
    }

    /// Freezes the current document on one press. Dropping the frozen
    /// snapshot loses the diff baseline, so it waits for a confirming press.
    pub fn toggle_freeze(&mut self, now: Instant) -> Press {
        if self.frozen.is_none() {
            self.unfreeze_gate.disarm();
            self.frozen = Some(self.document.clone());
            return Press::Confirmed;
        }
        let press = self.unfreeze_gate.press((), now);
        if press == Press::Confirmed {
            self.frozen = None;
        }
        press
    }

    pub fn is_unfreeze_armed(&self, now: Instant) -> bool {
        self.unfreeze_gate.is_armed(now)
    }

    /// Sets or drops the frozen snapshot directly.
    pub fn set_frozen(&mut self, frozen: Option<Value>) {
        self.frozen = frozen;
    }

    pub fn diff_pair(&self) -> DiffPair {
        DiffPair::new(self.frozen.as_ref(), &self.document)
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.search.set_live_text(text);
        self.refresh();
    }

    pub fn commit_search_text(&mut self) -> bool {
        let committed = self.search.commit_live_text();
        self.refresh();
        committed
    }

    pub fn remove_keyword(&mut self, keyword: &str) {
        self.search.remove_keyword(keyword);
        self.refresh();
    }

    /// Moves to the next match and returns the scroll offset that centres it.
    pub fn next_match(&mut self) -> Option<f64> {
        self.search.next()?;
        self.scroll_to_current_match()
    }

    pub fn previous_match(&mut self) -> Option<f64> {
        self.search.previous()?;
        self.scroll_to_current_match()
    }

    /// Records the viewport offset and returns the breadcrumb trail for the
    /// row at the top. An offset past the last row keeps the previous trail.
    pub fn on_scroll(&mut self, offset: f64) -> &[Crumb] {
        self.scroll_offset = offset.max(0.0);
        let rows = flatten(&self.document, &self.collapse);
        let row_height = self.config.view.row_height;
        if let Some(trail) = breadcrumbs_at(&rows, self.scroll_offset, row_height) {
            self.crumbs = trail;
        }
        &self.crumbs
    }

    /// Expands `path` with its ancestors and scrolls its row to the top.
    pub fn reveal(&mut self, path: &NodePath) -> Option<f64> {
        path.get(&self.document)?;
        self.collapse.reveal(path);
        self.refresh();
        let index = {
            let rows = self.rows();
            row_index_of(&rows, path)?
        };
        let offset = offset_for_top(index, self.config.view.row_height);
        self.on_scroll(offset);
        Some(offset)
    }

    /// Replaces both documents with a resolved share and clears the unsaved
    /// flag.
    pub fn load_shared(&mut self, shared: SharedDocuments) {
        self.frozen = Some(shared.frozen);
        self.scroll_offset = 0.0;
        self.replace_document(shared.live);
        self.unsaved = false;
    }

    /// Applies the tab parameter and returns the share id to fetch, if any.
    pub fn apply_launch(&mut self, params: &LaunchParams) -> Option<String> {
        if let Some(tab) = params.tab {
            self.tab = tab;
        }
        params.share.clone()
    }

    /// `(frozen, live)` as handed to the share codec.
    pub fn share_snapshots(&self) -> (Option<&Value>, &Value) {
        (self.frozen.as_ref(), &self.document)
    }

    /// Stores both snapshots and returns the link that reopens them on the
    /// current tab.
    pub async fn share<S: BlobStore>(&self, codec: &ShareCodec<S>) -> Result<String> {
        let (frozen, live) = self.share_snapshots();
        let id = codec.share(frozen, live).await?;
        Ok(share_url(&self.config.share.origin, &id, self.tab)?)
    }

    pub async fn open_shared<S: BlobStore>(
        &mut self,
        codec: &ShareCodec<S>,
        id: &str,
    ) -> Result<()> {
        let shared = codec.resolve(id).await?;
        self.load_shared(shared);
        Ok(())
    }

    /// Prompt to show before leaving with unsaved changes.
    pub fn navigation_guard(&self) -> Option<&'static str> {
        self.unsaved.then_some(NAVIGATION_PROMPT)
    }

    fn scroll_to_current_match(&mut self) -> Option<f64> {
        let offset = {
            let rows = flatten(&self.document, &self.collapse);
            let view = &self.config.view;
            self.search.current_offset(&rows, view.row_height, view.viewport_height)?
        };
        self.on_scroll(offset);
        Some(offset)
    }

    /// Installs a document produced by a mutation. Containers that did not
    /// exist before start collapsed unless expand-all is on.
    fn adopt(&mut self, mutation: Mutation) {
        let Mutation { document, effect } = mutation;
        let mut known = CollapseState::collapsed_all(&self.document);
        effect.apply(&mut known);
        effect.apply(&mut self.collapse);
        if !self.expand_all {
            for path in container_paths(&document) {
                if !known.is_collapsed(&path) {
                    self.collapse.collapse(path);
                }
            }
        }
        self.collapse.prune(&document);
        self.document = document;
        self.unsaved = true;
        self.refresh();
    }

    fn replace_document(&mut self, document: Value) {
        self.collapse = if self.expand_all {
            CollapseState::expanded()
        } else {
            CollapseState::collapsed_all(&document)
        };
        self.document = document;
        self.refresh();
    }

    fn refresh(&mut self) {
        let rows = flatten(&self.document, &self.collapse);
        self.search.refresh(&rows);
        let row_height = self.config.view.row_height;
        if let Some(trail) = breadcrumbs_at(&rows, self.scroll_offset, row_height) {
            self.crumbs = trail;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Config::default())
    }
}
