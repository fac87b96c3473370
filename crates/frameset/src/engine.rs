//! MiniJinja environment setup.
//!
//! Every [`TemplateSet`](crate::TemplateSet) owns one freshly built
//! [`Environment`]. This module creates that environment with the store's
//! options applied: undefined-value behaviour, name aliasing for includes,
//! and any user-registered hooks (filters, functions, globals).
//!
//! Hooks run on each rebuild, so custom filters survive a template swap.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior, Value};

/// Name of the slot through which a frame receives the output it wraps.
pub const CONTENT_KEY: &str = "Content";

/// Callback that customizes a newly built environment.
///
/// # Example
///
/// ```rust
/// use frameset::{MemorySource, TemplateStore};
///
/// let store = TemplateStore::builder(MemorySource::new().with("a.html", "{{ name | shout }}"))
///     .configure_environment(|env| {
///         env.add_filter("shout", |value: String| value.to_uppercase());
///     })
///     .build()
///     .unwrap();
///
/// let mut inv = store.invocation();
/// inv.set("name", "hi");
/// assert_eq!(inv.render("a.html").unwrap(), "HI");
/// ```
pub type EnvironmentHook = Arc<dyn Fn(&mut Environment<'static>) + Send + Sync>;

/// Engine settings shared by every build of a store.
#[derive(Clone, Default)]
pub struct EngineOptions {
    /// Treat undefined values as expansion errors.
    pub strict: bool,
    pub hooks: Vec<EnvironmentHook>,
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("strict", &self.strict)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Creates an environment for a new template set.
pub(crate) fn new_environment(options: &EngineOptions) -> Environment<'static> {
    let mut env = Environment::new();

    if options.strict {
        env.set_undefined_behavior(UndefinedBehavior::Strict);
    }

    for hook in &options.hooks {
        hook(&mut env);
    }

    env
}

/// Lets `{% include %}`, `{% extends %}` and `{% import %}` refer to a
/// template by its extensionless name.
pub(crate) fn install_aliases(env: &mut Environment<'static>, aliases: HashMap<String, String>) {
    env.set_path_join_callback(move |name, _parent| match aliases.get(name) {
        Some(file) => Cow::Owned(file.clone()),
        None => Cow::Borrowed(name),
    });
}

/// Builds the context a frame is expanded with.
///
/// Later layers win: frame arguments, then shared frame arguments, then the
/// wrapped content.
pub(crate) fn frame_context(
    args: &BTreeMap<String, Value>,
    shared: &BTreeMap<String, Value>,
    content: String,
) -> BTreeMap<String, Value> {
    let mut ctx = args.clone();
    ctx.extend(shared.iter().map(|(k, v)| (k.clone(), v.clone())));
    // Already-rendered markup; must not be escaped a second time.
    ctx.insert(CONTENT_KEY.to_string(), Value::from_safe_string(content));
    ctx
}
