//! Array values (spec.md section 3.2).
//!
//! Mapping state is kept as independent, individually nullable fields
//! (`ios`, `offset`, `elems_bound`, `size_bound`, `mapper`, `writer`)
//! mirroring `PVM_VAL_ARR_IOS`/`PVM_VAL_ARR_OFFSET`/... in the retained
//! `lib/pvm.h` reference rather than one grouped `Option<Mapping>` — this
//! is what makes the "polymorphic setter is a nop on non-mappable values"
//! law (spec.md section 8) a uniform per-field operation instead of a
//! special case for "establish vs. clear" mapping.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::TypeDesc;
use crate::value::Value;

/// A single array slot: the element's offset within the I/O space (Null
/// when the array is unmapped) and its cached value (Null for an empty
/// slot, as produced by `make_array` before any element is registered).
#[derive(Debug, Clone)]
pub struct ArrayElement {
    pub offset: Value,
    pub value: Value,
}

impl ArrayElement {
    fn empty() -> Self {
        ArrayElement {
            offset: Value::null(),
            value: Value::null(),
        }
    }
}

#[derive(Debug)]
pub struct ArrayData {
    pub elem_type: Rc<TypeDesc>,
    /// Ordered per-element (offset, cached value) pairs. `indexer` reads
    /// `elements[i].value`.
    pub elements: RefCell<Vec<ArrayElement>>,

    pub ios: RefCell<Value>,
    pub offset: RefCell<Value>,
    /// At most one of `elems_bound`/`size_bound` is non-null at a time
    /// (spec.md section 3.2: "exactly one of the two bounds may be present
    /// when mapped").
    pub elems_bound: RefCell<Value>,
    pub size_bound: RefCell<Value>,
    pub mapper: RefCell<Value>,
    pub writer: RefCell<Value>,
}

impl ArrayData {
    pub fn new(nelem: u64, elem_type: Rc<TypeDesc>) -> Self {
        ArrayData {
            elem_type,
            elements: RefCell::new((0..nelem).map(|_| ArrayElement::empty()).collect()),
            ios: RefCell::new(Value::null()),
            offset: RefCell::new(Value::null()),
            elems_bound: RefCell::new(Value::null()),
            size_bound: RefCell::new(Value::null()),
            mapper: RefCell::new(Value::null()),
            writer: RefCell::new(Value::null()),
        }
    }

    pub fn nelem(&self) -> u64 {
        self.elements.borrow().len() as u64
    }

    /// An array is mapped precisely when it carries an I/O-space id; the
    /// other mapping fields are set/cleared in lockstep by the mapping
    /// layer (external), never independently of `ios`.
    pub fn is_mapped(&self) -> bool {
        !self.ios.borrow().is_null()
    }
}

impl PartialEq for ArrayData {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
