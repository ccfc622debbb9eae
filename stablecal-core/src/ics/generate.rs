//! ICS content generation.

use crate::component::Component;
use crate::ics::text::fold_line;

/// Render a component (usually the VCALENDAR root) and everything nested in
/// it. Properties come out in canonical order, lines are folded and end in
/// CRLF.
pub fn generate_ics(component: &Component) -> String {
    let mut out = String::new();
    write_component(&mut out, component);
    out
}

fn write_component(out: &mut String, component: &Component) {
    let kind = component.kind().as_str();
    push_line(out, &format!("BEGIN:{kind}"));

    for (name, value) in component.properties() {
        push_line(out, &format!("{name}{}:{}", value.params(), value.to_ics()));
    }

    for child in component.components() {
        write_component(out, child);
    }

    push_line(out, &format!("END:{kind}"));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}
