//! Content-type registry.
//!
//! An immutable configuration map built once at startup via
//! [`RegistryBuilder`] and passed by reference to whoever needs permission
//! lookups or type enumeration. Each type is indexed under both its short
//! name and its qualified `"app.name"` key.

use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// ContentTypeSpec
// ---------------------------------------------------------------------------

/// Static description of a registered content type.
#[derive(Debug, Clone)]
pub struct ContentTypeSpec {
    /// Short model name, e.g. `"newsitem"`.
    pub name: String,
    /// Owning application id, e.g. `"intranet"`.
    pub app: String,
    /// Front-end display name.
    pub label: String,
    /// Plural display name.
    pub name_plural: String,
    /// Label shown in search filters; `None` hides the type from filters.
    pub filter_label: Option<String>,
    /// Whether the type appears in the global add menu.
    pub global_add: bool,
    /// Whether the type appears in the global search filters.
    pub global_filter: bool,
    /// Whether the type can be added within a group context.
    pub group_add: bool,
    /// Permission required to add an instance.
    pub add_permission: String,
    /// Permission required to use the type in search filters.
    pub view_permission: String,
    /// Permission required to edit an instance.
    pub edit_permission: String,
    /// Permission required to delete an instance.
    pub delete_permission: String,
}

impl ContentTypeSpec {
    /// Create a spec with conventional defaults.
    ///
    /// Permissions default to the `"{app}.{action}_{name}"` convention,
    /// the plural label to `"{label}s"`, and all menu flags to off.
    pub fn new(app: impl Into<String>, name: impl Into<String>, label: impl Into<String>) -> Self {
        let app = app.into();
        let name = name.into();
        let label = label.into();

        Self {
            add_permission: format!("{app}.add_{name}"),
            view_permission: format!("{app}.view_{name}"),
            edit_permission: format!("{app}.change_{name}"),
            delete_permission: format!("{app}.delete_{name}"),
            name_plural: format!("{label}s"),
            filter_label: None,
            global_add: false,
            global_filter: false,
            group_add: false,
            name,
            app,
            label,
        }
    }

    /// Qualified `"app.name"` key.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.app, self.name)
    }

    /// Route name for the type's detail view, `"{app}_view_{name}"`.
    pub fn view_route(&self) -> String {
        format!("{}_view_{}", self.app, self.name)
    }

    /// Override the plural display name.
    pub fn with_name_plural(mut self, plural: impl Into<String>) -> Self {
        self.name_plural = plural.into();
        self
    }

    /// Show the type in search filters under the given label.
    pub fn with_filter_label(mut self, label: impl Into<String>) -> Self {
        self.filter_label = Some(label.into());
        self
    }

    /// Override the default permission strings.
    pub fn with_permissions(
        mut self,
        add: impl Into<String>,
        view: impl Into<String>,
        edit: impl Into<String>,
        delete: impl Into<String>,
    ) -> Self {
        self.add_permission = add.into();
        self.view_permission = view.into();
        self.edit_permission = edit.into();
        self.delete_permission = delete.into();
        self
    }

    /// Show the type in the global add menu.
    pub fn allow_global_add(mut self) -> Self {
        self.global_add = true;
        self
    }

    /// Show the type in the global search filters.
    pub fn allow_global_filter(mut self) -> Self {
        self.global_filter = true;
        self
    }

    /// Allow adding the type within a group context.
    pub fn allow_group_add(mut self) -> Self {
        self.group_add = true;
        self
    }
}

// ---------------------------------------------------------------------------
// RegistryBuilder
// ---------------------------------------------------------------------------

/// Collects [`ContentTypeSpec`]s and produces the immutable registry.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: HashMap<String, Arc<ContentTypeSpec>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content type under both its short and qualified name.
    ///
    /// Registering the same name again replaces the earlier spec.
    pub fn register(mut self, spec: ContentTypeSpec) -> Self {
        let spec = Arc::new(spec);
        self.types.insert(spec.name.clone(), Arc::clone(&spec));
        self.types.insert(spec.qualified_name(), spec);
        self
    }

    /// Freeze the collected specs into a [`ContentTypeRegistry`].
    pub fn build(self) -> ContentTypeRegistry {
        ContentTypeRegistry { types: self.types }
    }
}

// ---------------------------------------------------------------------------
// ContentTypeRegistry
// ---------------------------------------------------------------------------

/// Immutable lookup table for registered content types.
#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    types: HashMap<String, Arc<ContentTypeSpec>>,
}

impl ContentTypeRegistry {
    /// Look up a spec by short or qualified name.
    pub fn get(&self, name: &str) -> Option<&ContentTypeSpec> {
        self.types.get(name).map(Arc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Display label for a type, if registered.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.get(name).map(|spec| spec.label.as_str())
    }

    /// Permission required to view the type; `None` if unregistered.
    pub fn view_permission(&self, name: &str) -> Option<&str> {
        self.get(name).map(|spec| spec.view_permission.as_str())
    }

    /// Whether the type appears in the global add menu (false if unknown).
    pub fn can_global_add(&self, name: &str) -> bool {
        self.get(name).map(|spec| spec.global_add).unwrap_or(false)
    }

    /// All qualified `"app.name"` keys, minus the given exclusions.
    ///
    /// Short-name aliases are filtered out so each type appears once.
    pub fn qualified_names(&self, excludes: &[&str]) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .keys()
            .map(String::as_str)
            .filter(|key| key.contains('.') && !excludes.contains(key))
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types (not counting short-name aliases).
    pub fn len(&self) -> usize {
        self.types.keys().filter(|key| key.contains('.')).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ContentTypeRegistry {
        RegistryBuilder::new()
            .register(
                ContentTypeSpec::new("intranet", "newsitem", "News item")
                    .allow_global_add()
                    .allow_global_filter()
                    .with_filter_label("News"),
            )
            .register(
                ContentTypeSpec::new("intranet", "event", "Event")
                    .allow_group_add()
                    .with_name_plural("Events"),
            )
            .build()
    }

    #[test]
    fn lookup_by_short_name() {
        let registry = registry();
        assert_eq!(registry.get("newsitem").unwrap().label, "News item");
    }

    #[test]
    fn lookup_by_qualified_name() {
        let registry = registry();
        assert_eq!(registry.get("intranet.newsitem").unwrap().label, "News item");
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(registry().get("weblog").is_none());
        assert!(!registry().contains("weblog"));
    }

    #[test]
    fn default_permissions_follow_convention() {
        let spec = ContentTypeSpec::new("intranet", "newsitem", "News item");
        assert_eq!(spec.add_permission, "intranet.add_newsitem");
        assert_eq!(spec.view_permission, "intranet.view_newsitem");
        assert_eq!(spec.edit_permission, "intranet.change_newsitem");
        assert_eq!(spec.delete_permission, "intranet.delete_newsitem");
    }

    #[test]
    fn permission_override() {
        let spec = ContentTypeSpec::new("intranet", "newsitem", "News item").with_permissions(
            "intranet.manage_news",
            "intranet.read_news",
            "intranet.manage_news",
            "intranet.manage_news",
        );
        assert_eq!(spec.view_permission, "intranet.read_news");
        assert_eq!(spec.add_permission, "intranet.manage_news");
    }

    #[test]
    fn view_route_follows_convention() {
        let spec = ContentTypeSpec::new("intranet", "newsitem", "News item");
        assert_eq!(spec.view_route(), "intranet_view_newsitem");
    }

    #[test]
    fn qualified_names_excludes_aliases_and_requested_keys() {
        let registry = registry();
        assert_eq!(
            registry.qualified_names(&[]),
            vec!["intranet.event", "intranet.newsitem"]
        );
        assert_eq!(
            registry.qualified_names(&["intranet.event"]),
            vec!["intranet.newsitem"]
        );
    }

    #[test]
    fn len_counts_types_once() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn re_registration_replaces_spec() {
        let registry = RegistryBuilder::new()
            .register(ContentTypeSpec::new("intranet", "newsitem", "News item"))
            .register(ContentTypeSpec::new("intranet", "newsitem", "Bulletin"))
            .build();
        assert_eq!(registry.label("newsitem"), Some("Bulletin"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_accessors_with_defaults() {
        let registry = registry();
        assert!(registry.can_global_add("newsitem"));
        assert!(!registry.can_global_add("event"));
        assert!(!registry.can_global_add("weblog"));
        assert_eq!(
            registry.view_permission("intranet.event"),
            Some("intranet.view_event")
        );
    }
}
