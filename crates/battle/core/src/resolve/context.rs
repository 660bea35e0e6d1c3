use crate::battler::Battler;
use crate::data::UsableDefinition;
use crate::formula::Scope;

/// Bindings of one evaluation: `a` acts, `b` receives, `item` is used.
#[derive(Clone, Copy, Debug)]
pub struct ModifierContext<'a> {
    pub subject: &'a Battler,
    pub target: Option<&'a Battler>,
    pub item: Option<&'a UsableDefinition>,
}

impl<'a> ModifierContext<'a> {
    pub fn new(subject: &'a Battler) -> Self {
        Self {
            subject,
            target: None,
            item: None,
        }
    }

    pub fn with_target(mut self, target: &'a Battler) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_item(mut self, item: &'a UsableDefinition) -> Self {
        self.item = Some(item);
        self
    }

    /// Fresh scope binding `a`, and `b`/`item` when present.
    pub fn scope(&self) -> Scope<'a> {
        let mut scope = Scope::new().with_object("a", self.subject);
        if let Some(target) = self.target {
            scope = scope.with_object("b", target);
        }
        if let Some(item) = self.item {
            scope = scope.with_object("item", item);
        }
        scope
    }
}
