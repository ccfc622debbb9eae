//! Calendar components as typed property maps.

use std::collections::BTreeMap;

use crate::property::{PropertyName, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Calendar,
    Event,
    TimeZone,
    Standard,
    Daylight,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Calendar => "VCALENDAR",
            ComponentKind::Event => "VEVENT",
            ComponentKind::TimeZone => "VTIMEZONE",
            ComponentKind::Standard => "STANDARD",
            ComponentKind::Daylight => "DAYLIGHT",
        }
    }
}

/// A calendar component.
///
/// Properties live in a map keyed by [`PropertyName`], so they are always
/// iterated (and written) in canonical order no matter how they were
/// inserted. Each property appears at most once. Sub-components keep their
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    kind: ComponentKind,
    properties: BTreeMap<PropertyName, Value>,
    components: Vec<Component>,
}

impl Component {
    pub fn new(kind: ComponentKind) -> Self {
        Component {
            kind,
            properties: BTreeMap::new(),
            components: Vec::new(),
        }
    }

    pub fn event() -> Self {
        Component::new(ComponentKind::Event)
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Set a property, replacing any previous value.
    pub fn insert(&mut self, name: PropertyName, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(name, value.into());
        self
    }

    /// Set a property only when a value is present.
    pub fn insert_opt(&mut self, name: PropertyName, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    pub fn get(&self, name: PropertyName) -> Option<&Value> {
        self.properties.get(&name)
    }

    pub fn uid(&self) -> Option<&str> {
        self.get(PropertyName::Uid).and_then(Value::as_text)
    }

    /// Properties in canonical order.
    pub fn properties(&self) -> impl Iterator<Item = (PropertyName, &Value)> {
        self.properties.iter().map(|(name, value)| (*name, value))
    }

    pub fn push(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub(crate) fn components_mut(&mut self) -> &mut Vec<Component> {
        &mut self.components
    }

    /// Key used to order top-level components: the UID, with components
    /// that have none sorting first.
    pub fn sort_key(&self) -> Option<&str> {
        self.uid()
    }

    /// This component and every nested component, depth first.
    pub fn walk(&self) -> Vec<&Component> {
        let mut out = vec![self];
        for child in &self.components {
            out.extend(child.walk());
        }
        out
    }
}
