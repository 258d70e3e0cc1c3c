mod api;
mod geolocation;
mod leaflet;
mod panel;
mod radar;

use std::cell::RefCell;
use std::rc::Rc;

use circle_core::cities::City;
use circle_core::client::{is_local_host, AnalyzeRequest};
use circle_core::error::CircleError;
use circle_core::geolocate::LOCATED_MESSAGE;
use circle_core::map::{BaseLayer, MAP_CONTAINER_ID, SELECTION_ZOOM};
use circle_core::render::isochrone::isochrone_layers;
use circle_core::render::poi::poi_markers;
use circle_core::search::{located_message, Place};
use circle_core::state::{
    AppState, Completion, NoticeLevel, RequestId, RequestIds, NOTICE_TIMEOUT_MS,
};
use circle_core::types::{AnalysisResult, Category, LatLng};
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use web_sys::HtmlElement;
use yew::prelude::*;

use leaflet::MapHandle;
use panel::*;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}

// ─── Store ──────────────────────────────────────────────────────────

#[derive(PartialEq)]
struct Store(AppState);

impl std::ops::Deref for Store {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.0
    }
}

enum Action {
    Analyze { point: LatLng, id: RequestId },
    Completed {
        id: RequestId,
        outcome: Result<AnalysisResult, CircleError>,
    },
    SetWalkSpeed(f64),
    SetCategory(Category, bool),
    SetAllCategories(bool),
    SwitchCity(String),
    SetBaseLayer(BaseLayer),
    Notify(NoticeLevel, String),
    DismissNotice(u64),
    Resize(f64),
    OpenSidebar,
    CloseSidebar,
}

impl Reducible for Store {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Action) -> Rc<Self> {
        let mut state = self.0.clone();
        match action {
            Action::Analyze { point, id } => {
                state.select_location(point);
                state.begin_analysis(id);
            }
            Action::Completed { id, outcome } => {
                if state.complete_analysis(id, outcome) == Completion::Stale {
                    return self;
                }
            }
            Action::SetWalkSpeed(speed) => {
                if let Err(e) = state.set_walk_speed(speed) {
                    log::warn!("{e}");
                    return self;
                }
            }
            Action::SetCategory(category, visible) => state.set_category_visible(category, visible),
            Action::SetAllCategories(visible) => state.set_all_categories(visible),
            Action::SwitchCity(key) => {
                if let Err(e) = state.switch_city(&key) {
                    log::warn!("{e}");
                    state.notify(NoticeLevel::Error, e.user_message());
                }
            }
            Action::SetBaseLayer(layer) => state.set_base_layer(layer),
            Action::Notify(level, message) => {
                state.notify(level, message);
            }
            Action::DismissNotice(id) => {
                if state.notice.as_ref().map(|n| n.id) != Some(id) {
                    return self;
                }
                state.dismiss_notice(id);
            }
            Action::Resize(width) => state.set_viewport_width(width),
            Action::OpenSidebar => state.open_sidebar(),
            Action::CloseSidebar => state.close_sidebar(),
        }
        Rc::new(Store(state))
    }
}

fn page_is_local() -> bool {
    web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .map(|h| is_local_host(&h))
        .unwrap_or(false)
}

fn viewport_width() -> Option<f64> {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
}

// ─── App Component ──────────────────────────────────────────────────

#[function_component(App)]
fn app() -> Html {
    let store = use_reducer(|| Store(AppState::new(page_is_local())));
    let map: Rc<RefCell<Option<MapHandle>>> = use_mut_ref(|| None);
    let map_ref = use_node_ref();
    let request_ids = use_mut_ref(RequestIds::default);
    let shown_city = use_mut_ref(|| None::<&'static str>);
    // The map's click closure is built once; it reads the newest callback
    // through this cell.
    let on_pick = use_mut_ref(Callback::<LatLng>::noop);

    let start_analysis = {
        let dispatcher = store.dispatcher();
        let request_ids = request_ids.clone();
        let walk_speed = store.walk_speed;
        Callback::from(move |point: LatLng| {
            let id = request_ids.borrow_mut().next_id();
            dispatcher.dispatch(Action::Analyze { point, id });
            let request = AnalyzeRequest::new(point, walk_speed);
            log::info!("Analyzing {:.6},{:.6} at {walk_speed} km/h", point.lat, point.lng);
            let dispatcher = dispatcher.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = api::analyze(&request).await;
                dispatcher.dispatch(Action::Completed { id, outcome });
            });
        })
    };
    *on_pick.borrow_mut() = start_analysis.clone();

    // Create the map once the container exists
    {
        let map = map.clone();
        let map_ref = map_ref.clone();
        let on_pick = on_pick.clone();
        let shown_city = shown_city.clone();
        let city = store.city;
        let layer = store.base_layer;
        use_effect_with((), move |_| {
            if let Some(element) = map_ref.cast::<HtmlElement>() {
                let on_click = move |point: LatLng| {
                    let pick = on_pick.borrow().clone();
                    pick.emit(point);
                };
                match MapHandle::new(&element, city, layer, on_click) {
                    Ok(handle) => {
                        *map.borrow_mut() = Some(handle);
                        *shown_city.borrow_mut() = Some(city.key);
                    }
                    Err(e) => log::error!("Failed to create map: {e:?}"),
                }
            }
            || ()
        });
    }

    // City change: fly to the new city
    {
        let map = map.clone();
        let shown_city = shown_city.clone();
        use_effect_with(store.city.key, move |key| {
            let changed = *shown_city.borrow() != Some(*key);
            if changed {
                if let (Some(handle), Ok(city)) = (
                    map.borrow().as_ref(),
                    City::find(key),
                ) {
                    handle.show_city(city, true);
                    *shown_city.borrow_mut() = Some(city.key);
                }
            }
            || ()
        });
    }

    // Isochrones follow the result
    {
        let map = map.clone();
        use_effect_with(store.result.clone(), move |result| {
            if let Some(handle) = map.borrow().as_ref() {
                let layers = result
                    .as_ref()
                    .map(|r| isochrone_layers(&r.isochrone))
                    .unwrap_or_default();
                handle.show_isochrones(&layers);
            }
            || ()
        });
    }

    // POI markers follow the result, the filter and the popup inputs
    {
        let map = map.clone();
        let deps = (
            store.result.clone(),
            store.filters,
            store.selected,
            store.walk_speed,
        );
        use_effect_with(deps, move |(result, filters, selected, speed)| {
            if let Some(handle) = map.borrow().as_ref() {
                let markers = result
                    .as_ref()
                    .map(|r| poi_markers(&r.pois, filters, *selected, *speed))
                    .unwrap_or_default();
                handle.show_pois(&markers);
            }
            || ()
        });
    }

    {
        let map = map.clone();
        use_effect_with(store.selected, move |selected| {
            if let Some(handle) = map.borrow().as_ref() {
                handle.show_selection(*selected);
            }
            || ()
        });
    }

    {
        let map = map.clone();
        use_effect_with(store.base_layer, move |layer| {
            if let Some(handle) = map.borrow().as_ref() {
                handle.set_base_layer(*layer);
            }
            || ()
        });
    }

    // Track the viewport for the mobile layout
    {
        let dispatcher = store.dispatcher();
        let map = map.clone();
        use_effect_with((), move |_| {
            if let Some(width) = viewport_width() {
                dispatcher.dispatch(Action::Resize(width));
            }
            let listener = web_sys::window().map(|window| {
                EventListener::new(&window, "resize", move |_| {
                    if let Some(width) = viewport_width() {
                        dispatcher.dispatch(Action::Resize(width));
                    }
                    if let Some(handle) = map.borrow().as_ref() {
                        handle.invalidate_size();
                    }
                })
            });
            move || drop(listener)
        });
    }

    // Auto-dismiss the current notice
    {
        let dispatcher = store.dispatcher();
        use_effect_with(store.notice.as_ref().map(|n| n.id), move |id| {
            let timeout = id.map(|id| {
                Timeout::new(NOTICE_TIMEOUT_MS, move || {
                    dispatcher.dispatch(Action::DismissNotice(id));
                })
            });
            move || drop(timeout)
        });
    }

    // ─── Callbacks ──────────────────────────────────────────────────

    let on_place = {
        let map = map.clone();
        let dispatcher = store.dispatcher();
        let start_analysis = start_analysis.clone();
        Callback::from(move |place: Place| {
            if let Some(handle) = map.borrow().as_ref() {
                handle.center_on(place.location, SELECTION_ZOOM);
            }
            start_analysis.emit(place.location);
            dispatcher.dispatch(Action::Notify(NoticeLevel::Success, located_message(&place)));
        })
    };

    let on_located = {
        let map = map.clone();
        let dispatcher = store.dispatcher();
        let start_analysis = start_analysis.clone();
        Callback::from(move |point: LatLng| {
            if let Some(handle) = map.borrow().as_ref() {
                handle.center_on(point, SELECTION_ZOOM);
            }
            start_analysis.emit(point);
            dispatcher.dispatch(Action::Notify(
                NoticeLevel::Success,
                LOCATED_MESSAGE.to_string(),
            ));
        })
    };

    let on_error = {
        let dispatcher = store.dispatcher();
        Callback::from(move |message: &'static str| {
            dispatcher.dispatch(Action::Notify(NoticeLevel::Error, message.to_string()));
        })
    };

    let dispatch = |make: fn() -> Action| {
        let dispatcher = store.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(make()))
    };
    let open_sidebar = dispatch(|| Action::OpenSidebar);
    let close_sidebar = dispatch(|| Action::CloseSidebar);

    let on_city = {
        let dispatcher = store.dispatcher();
        Callback::from(move |key: String| dispatcher.dispatch(Action::SwitchCity(key)))
    };
    let on_layer = {
        let dispatcher = store.dispatcher();
        Callback::from(move |layer: BaseLayer| dispatcher.dispatch(Action::SetBaseLayer(layer)))
    };
    let on_speed = {
        let dispatcher = store.dispatcher();
        Callback::from(move |speed: f64| dispatcher.dispatch(Action::SetWalkSpeed(speed)))
    };
    let on_toggle = {
        let dispatcher = store.dispatcher();
        Callback::from(move |(category, visible): (Category, bool)| {
            dispatcher.dispatch(Action::SetCategory(category, visible))
        })
    };
    let on_all = {
        let dispatcher = store.dispatcher();
        Callback::from(move |visible: bool| dispatcher.dispatch(Action::SetAllCategories(visible)))
    };

    // ─── Layout ─────────────────────────────────────────────────────

    let sidebar_open = store.is_mobile && store.sidebar_open;

    html! {
        <div class={classes!("app", store.is_mobile.then_some("mobile"))}>
            <aside class={classes!("sidebar", sidebar_open.then_some("open"))}>
                <div class="sidebar-header">
                    <h1>{ "15分钟生活圈" }</h1>
                    if store.is_mobile {
                        <button class="sidebar-close" title="关闭" onclick={close_sidebar.clone()}>{ "✕" }</button>
                    }
                </div>

                <section class="panel-section">
                    <h3>{ "城市" }</h3>
                    <CityPicker current={store.city.key} on_change={on_city} />
                </section>

                <section class="panel-section">
                    <h3>{ "当前位置" }</h3>
                    <LocationCard selected={store.selected} />
                </section>

                <section class="panel-section">
                    <SpeedPanel speed={store.walk_speed} on_change={on_speed} />
                </section>

                <section class="panel-section">
                    <h3>{ "设施筛选" }</h3>
                    <FilterPanel filters={store.filters} visible={store.visible_poi_count()}
                        {on_toggle} {on_all} />
                </section>

                <section class="panel-section">
                    <h3>{ "分析结果" }</h3>
                    {
                        match store.result.clone() {
                            Some(result) => html! {
                                <ResultPanel {result} is_mock={store.result_is_mock} />
                            },
                            None => html! {
                                <p class="placeholder">{ "点击地图或搜索地址开始分析" }</p>
                            },
                        }
                    }
                </section>
            </aside>

            if sidebar_open {
                <div class="sidebar-overlay" onclick={close_sidebar}></div>
            }

            <main class="map-wrapper">
                <div id={MAP_CONTAINER_ID} ref={map_ref}></div>
                <div class="map-controls">
                    if store.is_mobile {
                        <button class="sidebar-toggle" title="打开面板" onclick={open_sidebar}>{ "☰" }</button>
                    }
                    <SearchBox on_select={on_place} on_error={on_error.clone()}>
                        <LocateButton {on_located} {on_error} />
                    </SearchBox>
                    <BaseLayerPicker current={store.base_layer} on_change={on_layer} />
                </div>
                if store.is_loading() {
                    <div class="loading-overlay">
                        <div class="spinner"></div>
                        <span>{ "正在分析..." }</span>
                    </div>
                }
            </main>

            <Toast notice={store.notice.clone()} />
        </div>
    }
}
