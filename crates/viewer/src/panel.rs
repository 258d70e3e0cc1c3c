use std::rc::Rc;

use circle_core::cities::{City, CITIES};
use circle_core::geo::walk_distance_display;
use circle_core::map::BaseLayer;
use circle_core::render::score::ScoreView;
use circle_core::render::{location_lines, LOCATION_PLACEHOLDER};
use circle_core::search::{
    failure_message, first_place, should_suggest, validate_query, Place, SUGGEST_DEBOUNCE_MS,
};
use circle_core::state::{
    matches_preset, CategoryFilter, FilterAll, Notice, MAX_WALK_SPEED, MIN_WALK_SPEED,
    SPEED_PRESETS, WALK_SPEED_STEP,
};
use circle_core::types::{AnalysisResult, Category, LatLng};
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement, Node};
use yew::prelude::*;

use crate::api::search_places;
use crate::geolocation;
use crate::radar::Radar;

// ─── City picker ─────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct CityPickerProps {
    pub current: &'static str,
    pub on_change: Callback<String>,
}

#[function_component(CityPicker)]
pub fn city_picker(props: &CityPickerProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(select.value());
        })
    };
    let description = City::find(props.current)
        .map(|c| c.description)
        .unwrap_or_default();

    html! {
        <div class="city-selector">
            <select id="city-select" {onchange}>
                { for CITIES.iter().map(|c| html! {
                    <option value={c.key} selected={c.key == props.current}>{ c.name }</option>
                }) }
            </select>
            <div id="city-info" class="city-info">{ description }</div>
        </div>
    }
}

// ─── Base layer picker ───────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct BaseLayerPickerProps {
    pub current: BaseLayer,
    pub on_change: Callback<BaseLayer>,
}

#[function_component(BaseLayerPicker)]
pub fn base_layer_picker(props: &BaseLayerPickerProps) -> Html {
    let onchange = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(layer) = BaseLayer::from_key(&select.value()) {
                on_change.emit(layer);
            }
        })
    };

    html! {
        <select class="base-layer-select" title="底图" {onchange}>
            { for BaseLayer::ALL.iter().map(|l| html! {
                <option value={l.key()} selected={*l == props.current}>{ l.label() }</option>
            }) }
        </select>
    }
}

// ─── Search ──────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct SearchBoxProps {
    pub on_select: Callback<Place>,
    pub on_error: Callback<&'static str>,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(SearchBox)]
pub fn search_box(props: &SearchBoxProps) -> Html {
    let query = use_state(String::new);
    let places: UseStateHandle<Vec<Place>> = use_state(Vec::new);
    let open = use_state(|| false);
    let debounce = use_mut_ref(|| None::<Timeout>);
    // Suggestion lookups are numbered; only the newest may fill the list.
    let latest = use_mut_ref(|| 0u64);
    let panel = use_node_ref();

    // Clicks outside the panel close the list
    {
        let open = open.clone();
        let panel = panel.clone();
        use_effect_with((), move |_| {
            let listener = web_sys::window().and_then(|w| w.document()).map(|doc| {
                EventListener::new(&doc, "click", move |e| {
                    let target = e.target().and_then(|t| t.dyn_into::<Node>().ok());
                    let inside = match (panel.get(), target) {
                        (Some(p), Some(t)) => p.contains(Some(&t)),
                        _ => false,
                    };
                    if !inside {
                        open.set(false);
                    }
                })
            });
            move || drop(listener)
        });
    }

    let oninput = {
        let query = query.clone();
        let places = places.clone();
        let open = open.clone();
        let debounce = debounce.clone();
        let latest = latest.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            query.set(value.clone());
            debounce.borrow_mut().take();

            if !should_suggest(&value) {
                *latest.borrow_mut() += 1;
                open.set(false);
                return;
            }

            let places = places.clone();
            let open = open.clone();
            let latest = latest.clone();
            let timeout = Timeout::new(SUGGEST_DEBOUNCE_MS, move || {
                let seq = {
                    let mut l = latest.borrow_mut();
                    *l += 1;
                    *l
                };
                wasm_bindgen_futures::spawn_local(async move {
                    match search_places(value.trim()).await {
                        Ok(found) => {
                            if *latest.borrow() == seq {
                                open.set(!found.is_empty());
                                places.set(found);
                            }
                        }
                        Err(e) => log::warn!("Suggestion lookup failed: {e}"),
                    }
                });
            });
            *debounce.borrow_mut() = Some(timeout);
        })
    };

    let select = {
        let query = query.clone();
        let open = open.clone();
        let latest = latest.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |place: Place| {
            *latest.borrow_mut() += 1;
            open.set(false);
            query.set(place.name.clone());
            on_select.emit(place);
        })
    };

    let submit = {
        let query = query.clone();
        let debounce = debounce.clone();
        let select = select.clone();
        let on_error = props.on_error.clone();
        Callback::from(move |_: ()| {
            debounce.borrow_mut().take();
            let q = match validate_query(query.as_str()) {
                Ok(q) => q.to_string(),
                Err(e) => {
                    on_error.emit(failure_message(&e));
                    return;
                }
            };
            let select = select.clone();
            let on_error = on_error.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = search_places(&q)
                    .await
                    .and_then(|found| first_place(&found).cloned());
                match outcome {
                    Ok(place) => select.emit(place),
                    Err(e) => {
                        log::warn!("Search for {q:?} failed: {e}");
                        on_error.emit(failure_message(&e));
                    }
                }
            });
        })
    };

    let onkeypress = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit.emit(());
            }
        })
    };
    let onclick = submit.reform(|_: MouseEvent| ());

    html! {
        <div id="search-panel" class="search-panel" ref={panel}>
            <div class="search-box">
                <input id="search-input" type="text" placeholder="搜索地址..."
                    value={(*query).clone()} {oninput} {onkeypress} />
                <button id="search-btn" class="search-btn" title="搜索" {onclick}>{ "🔍" }</button>
                { props.children.clone() }
            </div>
            if *open {
                <div id="search-results" class="search-results">
                    { for places.iter().cloned().map(|place| {
                        let onclick = select.reform({
                            let place = place.clone();
                            move |_: MouseEvent| place.clone()
                        });
                        html! {
                            <div class="search-result-item" {onclick}>
                                <div class="name">{ place.name }</div>
                                <div class="address">{ place.address }</div>
                            </div>
                        }
                    }) }
                </div>
            }
        </div>
    }
}

// ─── Locate ──────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct LocateButtonProps {
    pub on_located: Callback<LatLng>,
    pub on_error: Callback<&'static str>,
}

#[function_component(LocateButton)]
pub fn locate_button(props: &LocateButtonProps) -> Html {
    let busy = use_state(|| false);

    let onclick = {
        let busy = busy.clone();
        let on_located = props.on_located.clone();
        let on_error = props.on_error.clone();
        Callback::from(move |_: MouseEvent| {
            if *busy {
                return;
            }
            busy.set(true);
            let busy = busy.clone();
            let on_located = on_located.clone();
            let on_error = on_error.clone();
            geolocation::locate(move |outcome| {
                busy.set(false);
                match outcome {
                    Ok(point) => on_located.emit(point),
                    Err(failure) => {
                        log::warn!("Geolocation failed: {failure:?}");
                        on_error.emit(failure.message());
                    }
                }
            });
        })
    };

    html! {
        <button id="locate-btn" class={classes!("locate-btn", (*busy).then_some("locating"))}
            title="定位到当前位置" {onclick}>
            { if *busy { "⏳" } else { "📍" } }
        </button>
    }
}

// ─── Location card ───────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct LocationCardProps {
    pub selected: Option<LatLng>,
}

#[function_component(LocationCard)]
pub fn location_card(props: &LocationCardProps) -> Html {
    let body = match props.selected {
        Some(point) => {
            let (lng, lat) = location_lines(point);
            html! {
                <>
                    <p><strong>{ "经度:" }</strong>{ " " }{ lng }</p>
                    <p><strong>{ "纬度:" }</strong>{ " " }{ lat }</p>
                </>
            }
        }
        None => html! { <p class="placeholder">{ LOCATION_PLACEHOLDER }</p> },
    };
    html! {
        <div id="current-location" class="location-info">{ body }</div>
    }
}

// ─── Walk speed ──────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct SpeedPanelProps {
    pub speed: f64,
    pub on_change: Callback<f64>,
}

#[function_component(SpeedPanel)]
pub fn speed_panel(props: &SpeedPanelProps) -> Html {
    let oninput = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(v) = input.value().parse::<f64>() {
                on_change.emit(v);
            }
        })
    };
    let speed = props.speed;

    html! {
        <div class="speed-panel">
            <div class="speed-header">
                <span>{ "步行速度" }</span>
                <span><span id="speed-display">{ format!("{speed:.1}") }</span>{ " km/h" }</span>
            </div>
            <input id="walk-speed" type="range"
                min={MIN_WALK_SPEED.to_string()} max={MAX_WALK_SPEED.to_string()}
                step={WALK_SPEED_STEP.to_string()} value={speed.to_string()} {oninput} />
            <div class="speed-presets">
                { for SPEED_PRESETS.iter().map(|&preset| {
                    let onclick = props.on_change.reform(move |_: MouseEvent| preset);
                    let active = matches_preset(speed, preset);
                    html! {
                        <button class={classes!("speed-preset", active.then_some("active"))} {onclick}>
                            { format!("{preset:.1}") }
                        </button>
                    }
                }) }
            </div>
            <div class="walk-distance">
                { "15分钟步行距离: " }
                <span id="walk-distance">{ walk_distance_display(speed).to_string() }</span>
                { " 米" }
            </div>
        </div>
    }
}

// ─── Category filter ─────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct FilterPanelProps {
    pub filters: CategoryFilter,
    pub visible: usize,
    pub on_toggle: Callback<(Category, bool)>,
    pub on_all: Callback<bool>,
}

#[function_component(FilterPanel)]
pub fn filter_panel(props: &FilterPanelProps) -> Html {
    let all_ref = use_node_ref();

    // `indeterminate` has no HTML attribute; set it on the element.
    {
        let all_ref = all_ref.clone();
        use_effect_with(props.filters.all_state(), move |state| {
            if let Some(input) = all_ref.cast::<HtmlInputElement>() {
                input.set_checked(*state == FilterAll::Checked);
                input.set_indeterminate(*state == FilterAll::Indeterminate);
            }
            || ()
        });
    }

    let on_all = {
        let on_all = props.on_all.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_all.emit(input.checked());
        })
    };

    html! {
        <div class="poi-filter">
            <div class="filter-header">
                <label class="filter-checkbox filter-all">
                    <input id="filter-all" type="checkbox" ref={all_ref} onchange={on_all} />
                    <span>{ "全部" }</span>
                </label>
                <span class="poi-count">
                    { "显示 " }<span id="poi-count">{ props.visible.to_string() }</span>{ " 个设施" }
                </span>
            </div>
            <div id="poi-filter-list" class="filter-list">
                { for Category::ALL.iter().map(|&category| {
                    let on_toggle = props.on_toggle.clone();
                    let onchange = Callback::from(move |e: Event| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        on_toggle.emit((category, input.checked()));
                    });
                    html! {
                        <label class="filter-checkbox" data-category={category.code()}>
                            <input type="checkbox" checked={props.filters.is_visible(category)} {onchange} />
                            <span class="filter-dot" style={format!("background: {};", category.color())}></span>
                            <span>{ category.icon() }{ " " }{ category.label() }</span>
                        </label>
                    }
                }) }
            </div>
        </div>
    }
}

// ─── Result ──────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct ResultPanelProps {
    pub result: Rc<AnalysisResult>,
    pub is_mock: bool,
}

#[function_component(ResultPanel)]
pub fn result_panel(props: &ResultPanelProps) -> Html {
    let view = ScoreView::from_result(&props.result);

    html! {
        <div id="result-panel" class="result-panel">
            if props.is_mock {
                <div class="mock-banner">{ "演示数据：分析服务暂不可用" }</div>
            }
            <div class="score-card">
                <div class="score-main">
                    <span id="total-score" class="total-score">{ view.total }</span>
                    <span class="score-unit">{ "分" }</span>
                </div>
                <span id="grade-badge" class={view.grade_class}>{ view.grade }</span>
            </div>
            <p id="result-summary" class="result-summary">{ view.summary }</p>

            <h4>{ "各类设施评分" }</h4>
            <Radar scores={props.result.category_scores.clone()} />
            <div id="category-scores" class="category-scores">
                { for view.bars.into_iter().map(|bar| html! {
                    <div class="category-item">
                        <span class="category-icon">{ bar.icon }</span>
                        <div class="category-info">
                            <div class="category-name">{ bar.name.clone() }</div>
                            <div class="category-bar">
                                <div class="category-bar-fill" style={bar.style()}></div>
                            </div>
                        </div>
                        <span class="category-score-value">{ bar.label.clone() }</span>
                    </div>
                }) }
            </div>

            if !view.suggestions.is_empty() {
                <h4>{ "优化建议" }</h4>
                <ul id="suggestion-list" class="suggestion-list">
                    { for view.suggestions.iter().map(|s| html! { <li>{ s.clone() }</li> }) }
                </ul>
            }
        </div>
    }
}

// ─── Toast ───────────────────────────────────────────────────────────

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notice: Option<Notice>,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    match &props.notice {
        Some(n) => html! {
            <div class={classes!("toast", n.level.class())}>{ n.message.clone() }</div>
        },
        None => html! {},
    }
}
