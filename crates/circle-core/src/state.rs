//! Application state and its update functions.
//!
//! Everything the UI shows is derived from one [`AppState`] value. Updates
//! are plain methods so they can be driven by a Yew reducer in the browser,
//! by the CLI, or by tests without a DOM.

use std::rc::Rc;

use log::{debug, warn};

use crate::cities::City;
use crate::error::CircleError;
use crate::geo::walk_distance_display;
use crate::map::BaseLayer;
use crate::mock::mock_result;
use crate::render::poi::{poi_markers, PoiMarker};
use crate::types::{AnalysisResult, Category, LatLng};

pub const DEFAULT_WALK_SPEED: f64 = 5.0;
pub const MIN_WALK_SPEED: f64 = 3.0;
pub const MAX_WALK_SPEED: f64 = 7.0;
pub const WALK_SPEED_STEP: f64 = 0.5;
pub const SPEED_PRESETS: [f64; 3] = [4.0, 5.0, 6.0];

/// Whether a preset button should show as selected for `speed`.
pub fn matches_preset(speed: f64, preset: f64) -> bool {
    (speed - preset).abs() < 1e-9
}

/// Viewports this wide or narrower get the mobile layout.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

/// Toasts disappear after this long.
pub const NOTICE_TIMEOUT_MS: u32 = 3_000;

// ─── Request identifiers ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// Mints increasing request ids.
#[derive(Debug, Default)]
pub struct RequestIds {
    last: u64,
}

impl RequestIds {
    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response belonged to the newest request and was applied.
    Applied,
    /// A newer request was issued (or the city changed); response dropped.
    Stale,
}

// ─── Category filter ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter([bool; 8]);

impl Default for CategoryFilter {
    fn default() -> Self {
        Self([true; 8])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAll {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CategoryFilter {
    pub fn is_visible(&self, category: Category) -> bool {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: Category, visible: bool) {
        self.0[category.index()] = visible;
    }

    pub fn set_all(&mut self, visible: bool) {
        self.0 = [visible; 8];
    }

    pub fn all_state(&self) -> FilterAll {
        if self.0.iter().all(|v| *v) {
            FilterAll::Checked
        } else if self.0.iter().all(|v| !*v) {
            FilterAll::Unchecked
        } else {
            FilterAll::Indeterminate
        }
    }

    /// Categories currently hidden.
    pub fn hidden(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.is_visible(*c))
            .collect()
    }
}

// ─── Notices ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

// ─── App state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub city: &'static City,
    pub selected: Option<LatLng>,
    pub walk_speed: f64,
    pub filters: CategoryFilter,
    pub result: Option<Rc<AnalysisResult>>,
    /// The shown result is the offline demo, not a backend answer.
    pub result_is_mock: bool,
    pub base_layer: BaseLayer,
    pub notice: Option<Notice>,
    pub is_mobile: bool,
    pub sidebar_open: bool,
    /// Page runs on a development host and may show mock data.
    pub dev_host: bool,
    pending: Option<RequestId>,
    notices_issued: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl AppState {
    pub fn new(dev_host: bool) -> Self {
        Self {
            city: City::default_city(),
            selected: None,
            walk_speed: DEFAULT_WALK_SPEED,
            filters: CategoryFilter::default(),
            result: None,
            result_is_mock: false,
            base_layer: BaseLayer::default(),
            notice: None,
            is_mobile: false,
            sidebar_open: false,
            dev_host,
            pending: None,
            notices_issued: 0,
        }
    }

    // ─── Selection & walk speed ──────────────────────────────────────

    pub fn select_location(&mut self, point: LatLng) {
        self.selected = Some(point);
    }

    pub fn set_walk_speed(&mut self, speed: f64) -> Result<(), CircleError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(CircleError::InvalidWalkSpeed(speed));
        }
        self.walk_speed = speed;
        Ok(())
    }

    /// Meters covered in 15 minutes at the current speed.
    pub fn walk_distance_display(&self) -> i64 {
        walk_distance_display(self.walk_speed)
    }

    pub fn is_active_preset(&self, preset: f64) -> bool {
        matches_preset(self.walk_speed, preset)
    }

    // ─── Category filter ─────────────────────────────────────────────

    pub fn set_category_visible(&mut self, category: Category, visible: bool) {
        self.filters.set(category, visible);
    }

    pub fn set_all_categories(&mut self, visible: bool) {
        self.filters.set_all(visible);
    }

    pub fn filter_all(&self) -> FilterAll {
        self.filters.all_state()
    }

    // ─── Analysis lifecycle ──────────────────────────────────────────

    /// Mark `id` as the newest request. Older ids still in flight become
    /// stale.
    pub fn begin_analysis(&mut self, id: RequestId) {
        if self.pending.is_some_and(|p| p > id) {
            debug!("ignoring begin for superseded request {id:?}");
            return;
        }
        self.pending = Some(id);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the outcome of request `id`.
    ///
    /// Only the newest request may touch the result. Its completion clears
    /// the loading state whether it succeeded or not. A failure on a
    /// development host installs the mock result; elsewhere the previous
    /// result is left as it was.
    pub fn complete_analysis(
        &mut self,
        id: RequestId,
        outcome: Result<AnalysisResult, CircleError>,
    ) -> Completion {
        if self.pending != Some(id) {
            debug!("dropping stale analysis response {id:?}");
            return Completion::Stale;
        }
        self.pending = None;

        match outcome {
            Ok(result) => {
                self.result = Some(Rc::new(result));
                self.result_is_mock = false;
                self.close_sidebar_after_analysis();
            }
            Err(e) => {
                warn!("analysis failed: {e}");
                self.notify(NoticeLevel::Error, e.user_message());
                if self.dev_host {
                    let origin = self.selected.unwrap_or(self.city.center);
                    self.result = Some(Rc::new(mock_result(origin)));
                    self.result_is_mock = true;
                    self.close_sidebar_after_analysis();
                }
            }
        }
        Completion::Applied
    }

    /// Drop selection, result and any request in flight.
    pub fn clear_analysis(&mut self) {
        self.selected = None;
        self.result = None;
        self.result_is_mock = false;
        self.pending = None;
    }

    pub fn switch_city(&mut self, key: &str) -> Result<(), CircleError> {
        let city = City::find(key)?;
        self.clear_analysis();
        self.city = city;
        Ok(())
    }

    // ─── Derived views ───────────────────────────────────────────────

    /// Markers for the POIs that pass the category filter.
    pub fn visible_pois(&self) -> Vec<PoiMarker> {
        match &self.result {
            Some(result) => poi_markers(&result.pois, &self.filters, self.selected, self.walk_speed),
            None => Vec::new(),
        }
    }

    pub fn visible_poi_count(&self) -> usize {
        self.visible_pois().len()
    }

    // ─── Notices ─────────────────────────────────────────────────────

    /// Show `message`, replacing any current notice. Returns its id.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.notices_issued += 1;
        self.notice = Some(Notice {
            id: self.notices_issued,
            level,
            message: message.into(),
        });
        self.notices_issued
    }

    /// Hide notice `id` if it is still the one showing.
    pub fn dismiss_notice(&mut self, id: u64) {
        if self.notice.as_ref().is_some_and(|n| n.id == id) {
            self.notice = None;
        }
    }

    pub fn last_notice_id(&self) -> u64 {
        self.notices_issued
    }

    // ─── Layout ──────────────────────────────────────────────────────

    pub fn set_viewport_width(&mut self, width: f64) {
        self.is_mobile = width <= MOBILE_BREAKPOINT_PX;
        if !self.is_mobile {
            self.sidebar_open = false;
        }
    }

    pub fn open_sidebar(&mut self) {
        self.sidebar_open = true;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    fn close_sidebar_after_analysis(&mut self) {
        if self.is_mobile && self.sidebar_open {
            self.sidebar_open = false;
        }
    }

    pub fn set_base_layer(&mut self, layer: BaseLayer) {
        self.base_layer = layer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Feature, FeatureCollection};

    fn sample_result() -> AnalysisResult {
        let at = |lat, lng| LatLng::new(lat, lng);
        AnalysisResult {
            pois: FeatureCollection::new(vec![
                Feature::poi(at(30.275, 120.156), "medical", "社区医院", "hospital"),
                Feature::poi(at(30.276, 120.154), "medical", "药店", "pharmacy"),
                Feature::poi(at(30.273, 120.157), "commerce", "超市", "supermarket"),
                Feature::poi(at(30.272, 120.153), "transport", "公交站", "bus_stop"),
                Feature::poi(at(30.271, 120.152), "unknown", "?", "?"),
            ]),
            total_score: Some(81.0),
            grade: Some("B".into()),
            ..Default::default()
        }
    }

    fn state_with_result(dev_host: bool) -> (AppState, RequestIds) {
        let mut state = AppState::new(dev_host);
        let mut ids = RequestIds::default();
        state.select_location(LatLng::new(30.2741, 120.1551));
        let id = ids.next_id();
        state.begin_analysis(id);
        assert_eq!(state.complete_analysis(id, Ok(sample_result())), Completion::Applied);
        (state, ids)
    }

    #[test]
    fn test_click_example() {
        let mut state = AppState::default();
        state.set_walk_speed(5.0).unwrap();
        state.select_location(LatLng::new(30.2741, 120.1551));
        assert_eq!(state.walk_distance_display(), 1250);
        assert!(state.is_active_preset(5.0));
        assert!(!state.is_active_preset(4.0));
    }

    #[test]
    fn test_invalid_walk_speed_ignored() {
        let mut state = AppState::default();
        assert!(state.set_walk_speed(0.0).is_err());
        assert!(state.set_walk_speed(f64::NAN).is_err());
        assert_eq!(state.walk_speed, DEFAULT_WALK_SPEED);
    }

    #[test]
    fn test_toggle_category_keeps_cached_result() {
        let (mut state, _) = state_with_result(false);
        let before = state.result.clone();
        assert_eq!(state.visible_poi_count(), 4);

        state.set_category_visible(Category::Medical, false);
        assert_eq!(state.visible_poi_count(), 2);
        assert!(state
            .visible_pois()
            .iter()
            .all(|m| m.category != Category::Medical));
        assert_eq!(state.result, before);
        assert_eq!(state.filter_all(), FilterAll::Indeterminate);
    }

    #[test]
    fn test_filter_all_restores_count() {
        let (mut state, _) = state_with_result(false);
        let before = state.visible_poi_count();

        state.set_all_categories(false);
        assert_eq!(state.visible_poi_count(), 0);
        assert_eq!(state.filter_all(), FilterAll::Unchecked);

        state.set_all_categories(true);
        assert_eq!(state.visible_poi_count(), before);
        assert_eq!(state.filter_all(), FilterAll::Checked);
    }

    #[test]
    fn test_failure_on_remote_host_keeps_result_and_clears_loading() {
        let (mut state, mut ids) = state_with_result(false);
        let before = state.result.clone();

        let id = ids.next_id();
        state.begin_analysis(id);
        assert!(state.is_loading());

        let outcome = state.complete_analysis(id, Err(CircleError::Http { status: 500 }));
        assert_eq!(outcome, Completion::Applied);
        assert!(!state.is_loading());
        assert_eq!(state.result, before);
        assert!(!state.result_is_mock);
        let notice = state.notice.as_ref().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "分析失败，请重试");
    }

    #[test]
    fn test_failure_on_local_host_installs_mock() {
        let mut state = AppState::new(true);
        let mut ids = RequestIds::default();
        state.select_location(LatLng::new(30.2741, 120.1551));
        let id = ids.next_id();
        state.begin_analysis(id);
        state.complete_analysis(id, Err(CircleError::Network("offline".into())));

        assert!(!state.is_loading());
        assert!(state.result_is_mock);
        let result = state.result.as_ref().unwrap();
        assert_eq!(result.total_score, Some(72.5));
        assert_eq!(result.isochrone.features.len(), 3);
    }

    #[test]
    fn test_stale_response_never_overwrites_newer() {
        let mut state = AppState::default();
        let mut ids = RequestIds::default();
        let first = ids.next_id();
        state.begin_analysis(first);
        let second = ids.next_id();
        state.begin_analysis(second);

        let newer = AnalysisResult {
            total_score: Some(90.0),
            ..Default::default()
        };
        assert_eq!(state.complete_analysis(second, Ok(newer)), Completion::Applied);

        let older = AnalysisResult {
            total_score: Some(10.0),
            ..Default::default()
        };
        assert_eq!(state.complete_analysis(first, Ok(older)), Completion::Stale);
        assert_eq!(state.result.as_ref().unwrap().total_score, Some(90.0));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_out_of_order_begin_is_ignored() {
        let mut state = AppState::default();
        let mut ids = RequestIds::default();
        let first = ids.next_id();
        let second = ids.next_id();
        state.begin_analysis(second);
        state.begin_analysis(first);
        assert_eq!(
            state.complete_analysis(first, Ok(AnalysisResult::default())),
            Completion::Stale
        );
        assert!(state.is_loading());
    }

    #[test]
    fn test_switch_city_resets_and_invalidates() {
        let (mut state, mut ids) = state_with_result(false);
        let id = ids.next_id();
        state.begin_analysis(id);

        state.switch_city("shenyang").unwrap();
        assert_eq!(state.city.key, "shenyang");
        assert!(state.selected.is_none());
        assert!(state.result.is_none());
        assert!(!state.is_loading());
        assert_eq!(
            state.complete_analysis(id, Ok(sample_result())),
            Completion::Stale
        );
        assert!(state.result.is_none());
    }

    #[test]
    fn test_switch_to_unknown_city_changes_nothing() {
        let (mut state, _) = state_with_result(false);
        let before = state.clone();
        assert!(matches!(
            state.switch_city("atlantis"),
            Err(CircleError::UnknownCity(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_notices() {
        let mut state = AppState::default();
        let first = state.notify(NoticeLevel::Info, "one");
        let second = state.notify(NoticeLevel::Success, "two");
        state.dismiss_notice(first);
        assert_eq!(state.notice.as_ref().unwrap().message, "two");
        state.dismiss_notice(second);
        assert!(state.notice.is_none());
        assert_eq!(state.last_notice_id(), second);
    }

    #[test]
    fn test_mobile_sidebar() {
        let mut state = AppState::default();
        state.set_viewport_width(375.0);
        assert!(state.is_mobile);
        state.open_sidebar();

        let mut ids = RequestIds::default();
        let id = ids.next_id();
        state.begin_analysis(id);
        state.complete_analysis(id, Ok(AnalysisResult::default()));
        assert!(!state.sidebar_open);

        state.open_sidebar();
        state.set_viewport_width(1280.0);
        assert!(!state.is_mobile);
        assert!(!state.sidebar_open);

        state.set_viewport_width(768.0);
        assert!(state.is_mobile);
    }
}
