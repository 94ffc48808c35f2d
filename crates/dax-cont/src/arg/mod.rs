//! Worklet argument binding.
//!
//! Each control-side argument reports how long it wants the scheduling
//! domain to be, prepares an execution view sized to the agreed length,
//! and copies results back once the schedule succeeded. Inside the
//! schedule, execution views fetch one value per instance and store
//! written values back.
//!
//! Arguments are passed to the scheduler as a tuple; the tuple's values
//! form the worklet's `Values` tuple in the same order.

mod field;
mod topology;

use dax_device::DeviceAdapter;
use dax_types::{DaxError, DaxResult, Domain, Id};

pub use field::{Field, FieldExec};
pub use topology::{
    ExecutionTopology, FieldPoints, FieldPointsExec, Topology, TopologyExec, UnstructuredStorage,
};

/// Whether an argument is read, written, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    /// True if the argument's control data is transferred in.
    pub fn reads(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// True if the argument's execution data is copied back.
    pub fn writes(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// Execution-side view of one argument.
pub trait ExecArg {
    type Value;

    /// Produces the value for instance `index`.
    fn fetch(&self, index: Id) -> DaxResult<Self::Value>;

    /// Stores the value written by instance `index`. Read-only arguments
    /// ignore it.
    ///
    /// # Safety
    /// Each `index` must be stored by at most one instance per schedule.
    unsafe fn store(&self, _index: Id, _value: &Self::Value) {}
}

/// A control-side argument bound to device `D`.
pub trait Argument<D: DeviceAdapter> {
    type Value;
    type Exec<'a>: ExecArg<Value = Self::Value> + Sync
    where
        Self: 'a;

    /// Short description for error messages.
    fn describe(&self) -> String;

    /// The domain length this argument requires, or `None` if it adapts
    /// to whatever length the other arguments agree on.
    fn domain_length(&self, domain: Domain) -> DaxResult<Option<Id>>;

    /// Prepares the execution view for `size` instances.
    fn prepare<'a>(&'a mut self, size: Id) -> DaxResult<Self::Exec<'a>>;

    /// Copies results back after a successful schedule.
    fn finish(&mut self) {}

    /// Drops execution writes after a failed schedule.
    fn abort(&mut self) {}

    /// Bytes `prepare` will move to the execution side.
    fn bytes_to_execution(&self) -> u64 {
        0
    }

    /// Bytes `finish` will move back for `size` instances.
    fn bytes_to_control(&self, _size: Id) -> u64 {
        0
    }
}

/// Execution views of a whole argument tuple.
pub trait ExecList {
    type Values;

    fn fetch(&self, index: Id) -> DaxResult<Self::Values>;

    /// # Safety
    /// Each `index` must be stored by at most one instance per schedule.
    unsafe fn store(&self, index: Id, values: &Self::Values);
}

/// A tuple of arguments scheduled together.
pub trait ArgumentList<D: DeviceAdapter> {
    type Values;
    type Exec<'a>: ExecList<Values = Self::Values> + Sync
    where
        Self: 'a;

    /// The agreed domain length. Fails if constraining arguments disagree
    /// or if none constrains the length.
    fn domain_length(&self, domain: Domain) -> DaxResult<Id>;

    fn prepare<'a>(&'a mut self, size: Id) -> DaxResult<Self::Exec<'a>>;

    fn finish(&mut self);

    fn abort(&mut self);

    fn bytes_to_execution(&self) -> u64;

    fn bytes_to_control(&self, size: Id) -> u64;
}

/// Folds argument domain lengths into one agreed length.
struct LengthResolver {
    domain: Domain,
    length: Option<Id>,
}

impl LengthResolver {
    fn new(domain: Domain) -> Self {
        Self {
            domain,
            length: None,
        }
    }

    fn add<D: DeviceAdapter, A: Argument<D>>(&mut self, argument: &A) -> DaxResult<()> {
        let Some(actual) = argument.domain_length(self.domain)? else {
            return Ok(());
        };
        match self.length {
            None => self.length = Some(actual),
            Some(expected) if expected != actual => {
                return Err(DaxError::DomainMismatch {
                    argument: argument.describe(),
                    domain: self.domain,
                    expected,
                    actual,
                });
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn finish(self) -> DaxResult<Id> {
        self.length.ok_or_else(|| {
            DaxError::InvalidArgument(format!(
                "no argument determines the {} domain length",
                self.domain
            ))
        })
    }
}

macro_rules! impl_argument_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<D: DeviceAdapter, $($name: Argument<D>),+> ArgumentList<D> for ($($name,)+) {
            type Values = ($($name::Value,)+);
            type Exec<'a> = ($($name::Exec<'a>,)+) where Self: 'a;

            fn domain_length(&self, domain: Domain) -> DaxResult<Id> {
                let mut resolver = LengthResolver::new(domain);
                $(resolver.add::<D, $name>(&self.$idx)?;)+
                resolver.finish()
            }

            #[allow(non_snake_case)]
            fn prepare<'a>(&'a mut self, size: Id) -> DaxResult<Self::Exec<'a>> {
                let ($($name,)+) = self;
                Ok(($($name.prepare(size)?,)+))
            }

            fn finish(&mut self) {
                $(self.$idx.finish();)+
            }

            fn abort(&mut self) {
                $(self.$idx.abort();)+
            }

            fn bytes_to_execution(&self) -> u64 {
                0 $(+ self.$idx.bytes_to_execution())+
            }

            fn bytes_to_control(&self, size: Id) -> u64 {
                0 $(+ self.$idx.bytes_to_control(size))+
            }
        }

        impl<$($name: ExecArg),+> ExecList for ($($name,)+) {
            type Values = ($($name::Value,)+);

            fn fetch(&self, index: Id) -> DaxResult<Self::Values> {
                Ok(($(self.$idx.fetch(index)?,)+))
            }

            unsafe fn store(&self, index: Id, values: &Self::Values) {
                $(self.$idx.store(index, &values.$idx);)+
            }
        }
    };
}

impl_argument_tuple!(A0: 0);
impl_argument_tuple!(A0: 0, A1: 1);
impl_argument_tuple!(A0: 0, A1: 1, A2: 2);
impl_argument_tuple!(A0: 0, A1: 1, A2: 2, A3: 3);
impl_argument_tuple!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4);
