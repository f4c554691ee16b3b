//! SVG and HTML documents for the rendered map.

use crate::config::{MapConfig, TooltipConfig};
use crate::render::LegendLayout;
use crate::types::RegionShape;
use quick_xml::escape::escape;

const TOOLTIP_SCRIPT: &str = include_str!("../assets/tooltip.js");
const STYLESHEET: &str = include_str!("../assets/style.css");

/// The map surface. `standalone` adds the XML namespace so the document
/// can be opened on its own.
pub fn map_svg(shapes: &[RegionShape], legend: &LegendLayout, map: &MapConfig, standalone: bool) -> String {
    let mut out = String::with_capacity(shapes.len() * 512);
    let xmlns = if standalone { r#" xmlns="http://www.w3.org/2000/svg""# } else { "" };
    out.push_str(&format!(
        r#"<svg id="map"{} width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        xmlns,
        w = map.width,
        h = map.height
    ));
    out.push('\n');

    out.push_str("<g class=\"counties\">\n");
    for shape in shapes {
        let label = escape(&shape.label);
        out.push_str(&format!(
            r#"<path class="county" d="{}" fill="{}" data-fips="{}" data-education="{}" data-label="{}"><title>{}</title></path>"#,
            shape.path, shape.fill, shape.fips, shape.education, label, label
        ));
        out.push('\n');
    }
    out.push_str("</g>\n");

    out.push_str(&legend_svg(legend));
    out.push_str("</svg>\n");
    out
}

pub fn legend_svg(legend: &LegendLayout) -> String {
    let mut out = format!(
        "<g id=\"legend\" transform=\"translate({}, {})\">\n",
        legend.translate.0, legend.translate.1
    );
    for s in &legend.swatches {
        out.push_str(&format!(
            "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"></rect>\n",
            s.x, s.width, s.height, s.fill
        ));
    }
    for t in &legend.ticks {
        out.push_str(&format!(
            "<line x1=\"{x}\" x2=\"{x}\" y1=\"{}\" y2=\"{}\" stroke=\"black\" stroke-width=\"1px\"></line>\n",
            t.y1,
            t.y2,
            x = t.x
        ));
    }
    for l in &legend.labels {
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"0.7em\">{}</text>\n",
            l.x,
            l.y,
            escape(&l.text)
        ));
    }
    out.push_str("</g>\n");
    out
}

/// Full page: heading, inline map, hidden tooltip and the hover script.
pub fn html_page(svg: &str, map: &MapConfig, tooltip: &TooltipConfig) -> String {
    let title = escape(&map.title);
    let description = escape(&map.description);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
{STYLESHEET}</style>
</head>
<body>
<h1 id="title">{title}</h1>
<p id="description">{description}</p>
{svg}<div id="tooltip" data-education="0" data-offset-x="{}" data-offset-y="{}" style="display: none"></div>
<script>
{TOOLTIP_SCRIPT}</script>
</body>
</html>
"#,
        tooltip.offset_x, tooltip.offset_y
    )
}
