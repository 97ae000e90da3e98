//! Template packs
//!
//! A [`TemplatePack`] exports up to three maps (layout, widget, flow step)
//! from symbolic id to component. Ids are unique per category within a pack;
//! registering an id twice replaces the earlier component.

use crate::category::Category;
use indexmap::IndexMap;

/// Named set of components keyed by category and symbolic id
#[derive(Debug, Clone)]
pub struct TemplatePack<C> {
    name: String,
    priority: i32,
    layouts: IndexMap<String, C>,
    widgets: IndexMap<String, C>,
    flow_steps: IndexMap<String, C>,
}

impl<C> TemplatePack<C> {
    /// Create empty pack with priority 0
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            layouts: IndexMap::new(),
            widgets: IndexMap::new(),
            flow_steps: IndexMap::new(),
        }
    }

    /// Set priority; higher is consulted first
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a layout
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, id: impl Into<String>, component: C) -> Self {
        self.insert(Category::Layout, id, component);
        self
    }

    /// Add a widget
    #[inline]
    #[must_use]
    pub fn with_widget(mut self, id: impl Into<String>, component: C) -> Self {
        self.insert(Category::Widget, id, component);
        self
    }

    /// Add a flow step
    #[inline]
    #[must_use]
    pub fn with_flow_step(mut self, id: impl Into<String>, component: C) -> Self {
        self.insert(Category::FlowStep, id, component);
        self
    }

    /// Register a component, returning the one it replaced
    pub fn insert(&mut self, category: Category, id: impl Into<String>, component: C) -> Option<C> {
        self.map_mut(category).insert(id.into(), component)
    }

    /// Pack name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pack priority
    #[inline]
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Look up a component
    #[inline]
    #[must_use]
    pub fn get(&self, category: Category, id: &str) -> Option<&C> {
        self.map(category).get(id)
    }

    /// Check if the pack exposes `id` in `category`
    #[inline]
    #[must_use]
    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.map(category).contains_key(id)
    }

    /// Ids in `category`, in registration order
    pub fn ids(&self, category: Category) -> impl Iterator<Item = &str> {
        self.map(category).keys().map(String::as_str)
    }

    /// Total number of components across categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.layouts.len() + self.widgets.len() + self.flow_steps.len()
    }

    /// Check if the pack has no component
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self, category: Category) -> &IndexMap<String, C> {
        match category {
            Category::Layout => &self.layouts,
            Category::Widget => &self.widgets,
            Category::FlowStep => &self.flow_steps,
        }
    }

    fn map_mut(&mut self, category: Category) -> &mut IndexMap<String, C> {
        match category {
            Category::Layout => &mut self.layouts,
            Category::Widget => &mut self.widgets,
            Category::FlowStep => &mut self.flow_steps,
        }
    }
}
