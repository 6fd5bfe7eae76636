//! Cache engine tests.



/// Read-only instruction cache tests.
pub mod instr;
