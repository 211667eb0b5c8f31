use crate::ast::{SourceExtent, Statement};
use crate::error::EvalError;
use crate::types::{JsObject, JsValue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::BitOr;
use std::rc::Rc;

/// Result of evaluating a statement.
#[derive(Debug)]
pub enum Completion {
    Normal(JsValue),
    Break,
    Continue,
    Return(JsValue),
}

impl Completion {
    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }

    /// The carried value; `break`/`continue` carry none.
    pub fn value(&self) -> JsValue {
        match self {
            Completion::Normal(v) | Completion::Return(v) => v.clone(),
            Completion::Break | Completion::Continue => JsValue::Undefined,
        }
    }
}

pub type ObjRef = Rc<RefCell<JsObjectData>>;

/// (base, property-name) pair produced by identifier lookup and member access.
/// Never stored in variables or properties; consumed by get_value/put_value.
#[derive(Clone)]
pub struct Reference {
    pub base: Option<ObjRef>,
    pub name: String,
}

/// Result of evaluating an expression: a language value, or a reference that
/// the consumer must resolve. Keeping references out of `JsValue` means the
/// type system rules out a reference escaping into the object graph.
pub enum ExprValue {
    Value(JsValue),
    Ref(Reference),
}

impl ExprValue {
    pub fn undefined() -> Self {
        ExprValue::Value(JsValue::Undefined)
    }
}

/// Attribute bits of an own property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    pub read_only: bool,
    pub dont_enum: bool,
    pub dont_delete: bool,
}

impl PropertyAttributes {
    pub const NONE: Self = Self {
        read_only: false,
        dont_enum: false,
        dont_delete: false,
    };
    pub const READ_ONLY: Self = Self {
        read_only: true,
        dont_enum: false,
        dont_delete: false,
    };
    pub const DONT_ENUM: Self = Self {
        read_only: false,
        dont_enum: true,
        dont_delete: false,
    };
    pub const DONT_DELETE: Self = Self {
        read_only: false,
        dont_enum: false,
        dont_delete: true,
    };
}

impl BitOr for PropertyAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            read_only: self.read_only || rhs.read_only,
            dont_enum: self.dont_enum || rhs.dont_enum,
            dont_delete: self.dont_delete || rhs.dont_delete,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Property {
    pub value: JsValue,
    pub attributes: PropertyAttributes,
}

/// Native implementation of a call or construct thunk.
pub type NativeHandler =
    Rc<dyn Fn(&mut super::Interpreter, &JsValue, &[JsValue]) -> Result<JsValue, EvalError>>;

/// A callable attached to an object.
pub enum JsFunction {
    User(Rc<UserFunction>),
    Native(NativeHandler),
}

impl Clone for JsFunction {
    fn clone(&self) -> Self {
        match self {
            JsFunction::User(u) => JsFunction::User(u.clone()),
            JsFunction::Native(f) => JsFunction::Native(f.clone()),
        }
    }
}

impl std::fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsFunction::User(u) => write!(f, "JsFunction::User({:?})", u.name),
            JsFunction::Native(_) => write!(f, "JsFunction::Native"),
        }
    }
}

/// A function defined by source text, closed over its defining scope.
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    /// Names hoisted from the body: variable declarators and nested
    /// function-definition names.
    pub locals: Vec<String>,
    pub body: Vec<Statement>,
    /// Scope chain captured at the definition site.
    pub scope: ScopeRef,
    /// Heap id of the function object itself; `arguments.callee` refers to it
    /// by id so the self-reference cannot pin the object graph.
    pub object_id: u64,
}

/// How `new` treats an object.
#[derive(Clone)]
pub enum Construct {
    /// The protocol of user-defined functions: allocate a fresh object from
    /// the function's `prototype` property and delegate to the call thunk.
    Default { class_name: String },
    Native(NativeHandler),
}

/// A mutable heap entity: prototype-linked property map, optional boxed
/// primitive, optional call/construct thunks.
pub struct JsObjectData {
    pub id: Option<u64>,
    pub class_name: String,
    pub prototype: Option<ObjRef>,
    pub properties: HashMap<String, Property>,
    pub property_order: Vec<String>,
    pub internal_value: Option<JsValue>,
    pub call: Option<JsFunction>,
    pub construct: Option<Construct>,
}

impl JsObjectData {
    pub fn new(class_name: &str, prototype: Option<ObjRef>) -> Self {
        Self {
            id: None,
            class_name: class_name.to_string(),
            prototype,
            properties: HashMap::new(),
            property_order: Vec::new(),
            internal_value: None,
            call: None,
            construct: None,
        }
    }

    /// [[Get]]: own property, then the prototype chain, iteratively.
    pub fn get(&self, key: &str) -> JsValue {
        if let Some(p) = self.properties.get(key) {
            return p.value.clone();
        }
        let mut proto = self.prototype.clone();
        while let Some(obj) = proto {
            let o = obj.borrow();
            if let Some(p) = o.properties.get(key) {
                return p.value.clone();
            }
            proto = o.prototype.clone();
        }
        JsValue::Undefined
    }

    /// [[Put]] with default attributes. A read-only property absorbs the
    /// write silently.
    pub fn put(&mut self, key: &str, value: JsValue) {
        self.put_with_attributes(key, value, PropertyAttributes::NONE);
    }

    pub fn put_with_attributes(
        &mut self,
        key: &str,
        value: JsValue,
        attributes: PropertyAttributes,
    ) {
        if let Some(existing) = self.properties.get_mut(key) {
            if existing.attributes.read_only {
                return;
            }
            existing.value = value;
            existing.attributes = attributes;
            return;
        }
        self.property_order.push(key.to_string());
        self.properties
            .insert(key.to_string(), Property { value, attributes });
    }

    /// [[Delete]]: true unless an own property resists with dont_delete.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.properties.get(key) {
            None => true,
            Some(p) if p.attributes.dont_delete => false,
            Some(_) => {
                self.properties.remove(key);
                self.property_order.retain(|k| k != key);
                true
            }
        }
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// [[HasProperty]]: own or anywhere on the prototype chain.
    pub fn has_property(&self, key: &str) -> bool {
        if self.properties.contains_key(key) {
            return true;
        }
        let mut proto = self.prototype.clone();
        while let Some(obj) = proto {
            let o = obj.borrow();
            if o.properties.contains_key(key) {
                return true;
            }
            proto = o.prototype.clone();
        }
        false
    }

    /// Own enumerable keys in insertion order.
    pub fn enumerable_keys(&self) -> Vec<String> {
        self.property_order
            .iter()
            .filter(|k| {
                self.properties
                    .get(*k)
                    .is_some_and(|p| !p.attributes.dont_enum)
            })
            .cloned()
            .collect()
    }
}

pub type ScopeRef = Rc<Scope>;

/// One link of the scope chain. The activation of the outermost link is the
/// global object. `call_site` is populated while a call made from this scope
/// is in flight; stack traces snapshot it.
pub struct Scope {
    pub activation: ObjRef,
    pub prev: Option<ScopeRef>,
    pub call_site: RefCell<Option<SourceExtent>>,
}

impl Scope {
    pub fn new(activation: ObjRef, prev: Option<ScopeRef>) -> ScopeRef {
        Rc::new(Scope {
            activation,
            prev,
            call_site: RefCell::new(None),
        })
    }

    /// Resolve a name to a reference. The innermost activation that binds the
    /// name wins; a name bound nowhere (global included) yields a base-less
    /// reference, so reads fail, writes create globals, and `typeof` answers
    /// "undefined".
    pub fn lookup(&self, name: &str) -> Reference {
        let mut scope = self;
        loop {
            if scope.activation.borrow().has_property(name) {
                return Reference {
                    base: Some(scope.activation.clone()),
                    name: name.to_string(),
                };
            }
            match &scope.prev {
                Some(prev) => scope = prev,
                None => {
                    return Reference {
                        base: None,
                        name: name.to_string(),
                    };
                }
            }
        }
    }
}

pub(crate) const GC_THRESHOLD: usize = 4096;

/// Value handle for an arena-registered object.
pub(crate) fn object_handle(obj: &ObjRef) -> JsValue {
    let id = obj.borrow().id.expect("object not registered with the heap");
    JsValue::Object(JsObject { id })
}
