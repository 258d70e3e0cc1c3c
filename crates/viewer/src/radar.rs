use circle_core::render::radar::{
    radar_chart, AXIS_LINE, SERIES_AREA, SERIES_LINE, SPLIT_LINE, TOOLTIP_TITLE,
};
use circle_core::types::CategoryScore;
use yew::prelude::*;

/// Viewbox edge; the SVG scales with its container.
const VIEWBOX: f64 = 300.0;

#[derive(Properties, PartialEq)]
pub struct RadarProps {
    pub scores: Vec<CategoryScore>,
}

#[function_component(Radar)]
pub fn radar(props: &RadarProps) -> Html {
    let Some(chart) = radar_chart(&props.scores, VIEWBOX) else {
        return html! {};
    };

    let tooltip = format!("{TOOLTIP_TITLE}\n{}", chart.tooltip.join("\n"));
    let (cx, cy) = chart.center;

    html! {
        <div class="radar-chart">
            <svg viewBox={format!("0 0 {VIEWBOX} {VIEWBOX}")} preserveAspectRatio="xMidYMid meet">
                <title>{ tooltip }</title>
                { for chart.rings.iter().map(|ring| html! {
                    <polygon points={ring.points.clone()} fill={ring.fill}
                        stroke={SPLIT_LINE} stroke-width="1" />
                }) }
                { for chart.axes.iter().map(|axis| html! {
                    <line x1={cx.to_string()} y1={cy.to_string()}
                        x2={axis.end.0.to_string()} y2={axis.end.1.to_string()}
                        stroke={AXIS_LINE} stroke-width="1" />
                }) }
                <polygon class="radar-series" points={chart.series.clone()}
                    fill={SERIES_AREA} stroke={SERIES_LINE} stroke-width="2" />
                { for chart.axes.iter().map(|axis| html! {
                    <circle cx={axis.point.0.to_string()} cy={axis.point.1.to_string()} r="3"
                        fill={SERIES_LINE}>
                        <title>{ format!("{}: {:.0}分", axis.label, axis.score) }</title>
                    </circle>
                }) }
                { for chart.axes.iter().map(|axis| html! {
                    <text x={axis.label_at.0.to_string()} y={axis.label_at.1.to_string()}
                        text-anchor={axis.anchor} dominant-baseline="middle"
                        font-size="13" fill="#333">
                        { axis.label.clone() }
                    </text>
                }) }
            </svg>
        </div>
    }
}
