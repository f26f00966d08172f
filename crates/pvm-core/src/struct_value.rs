//! Struct values (spec.md section 3.3).
//!
//! Mapping state mirrors `array.rs`'s flat, independently-nullable fields
//! minus the two bounds (spec.md 3.3: "Mapping state mirrors 3.2 minus the
//! bounds") — `elems_bound`/`size_bound` simply don't exist on a struct;
//! callers asking for them get `Value::null()` back unconditionally.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::TypeDesc;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub bit_offset: u64,
    pub value: Value,
    /// Set once a field has been written since the struct was last mapped;
    /// cleared by the (external) writer after flushing to the I/O space.
    pub modified_since_map: bool,
}

#[derive(Debug)]
pub struct StructData {
    pub ty: Rc<TypeDesc>,
    /// Field order is significant; names must be unique (enforced by the
    /// constructor).
    pub fields: RefCell<Vec<StructField>>,
    /// Method order is not significant; names must be unique.
    pub methods: RefCell<Vec<(String, Value)>>,

    pub ios: RefCell<Value>,
    pub offset: RefCell<Value>,
    pub mapper: RefCell<Value>,
    pub writer: RefCell<Value>,
}

impl StructData {
    pub fn new(ty: Rc<TypeDesc>, nfields: u64, nmethods: u64) -> Self {
        let _ = nmethods; // reserved capacity only; methods are named and unordered.
        StructData {
            ty,
            fields: RefCell::new(Vec::with_capacity(nfields as usize)),
            methods: RefCell::new(Vec::new()),
            ios: RefCell::new(Value::null()),
            offset: RefCell::new(Value::null()),
            mapper: RefCell::new(Value::null()),
            writer: RefCell::new(Value::null()),
        }
    }

    pub fn nfields(&self) -> u64 {
        self.fields.borrow().len() as u64
    }

    pub fn is_mapped(&self) -> bool {
        !self.ios.borrow().is_null()
    }

    pub fn field_by_name(&self, name: &str) -> Option<Value> {
        self.fields
            .borrow()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.clone())
    }
}

impl PartialEq for StructData {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
