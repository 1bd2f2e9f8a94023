use crate::object::Object;
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

/// A frame shared between the evaluator and every closure that captured it.
pub type MutEnv = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    store: FxHashMap<String, Object>,
    outer: Option<MutEnv>,
}

impl Environment {
    pub fn new() -> MutEnv {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn new_enclosed(outer: MutEnv) -> MutEnv {
        Rc::new(RefCell::new(Self {
            store: FxHashMap::default(),
            outer: Some(outer),
        }))
    }

    /// Looks `ident` up in this frame, then outward through enclosing frames.
    pub fn get(&self, ident: &str) -> Option<Object> {
        match self.store.get(ident) {
            Some(object) => Some(object.clone()),
            None => self.outer.as_ref().and_then(|outer| outer.borrow().get(ident)),
        }
    }

    /// Binds in this frame only; enclosing frames are never touched.
    pub fn set(&mut self, ident: &str, object: Object) {
        self.store.insert(ident.to_string(), object);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let global = Environment::new();
        global.borrow_mut().set("x", Object::Integer(1));
        let inner = Environment::new_enclosed(Rc::clone(&global));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(1)));
        assert_eq!(inner.borrow().get("y"), None);
    }

    #[test]
    fn set_shadows_without_touching_outer() {
        let global = Environment::new();
        global.borrow_mut().set("x", Object::Integer(1));
        let inner = Environment::new_enclosed(Rc::clone(&global));
        inner.borrow_mut().set("x", Object::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Object::Integer(2)));
        assert_eq!(global.borrow().get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn set_overwrites_in_place() {
        let env = Environment::new();
        env.borrow_mut().set("x", Object::Integer(1));
        env.borrow_mut().set("x", Object::Str("one".to_string()));

        assert_eq!(env.borrow().get("x"), Some(Object::Str("one".to_string())));
    }
}
