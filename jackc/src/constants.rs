//! Names and values fixed by the target machine and its runtime library.

/// Runtime routine that multiplies the two topmost stack values.
pub const MULTIPLY: &str = "Math.multiply";

/// Runtime routine that divides the two topmost stack values.
pub const DIVIDE: &str = "Math.divide";

/// Runtime routine that allocates a block of memory, returning its base address.
pub const ALLOC: &str = "Memory.alloc";

/// Runtime routine that creates a string object with the given capacity.
pub const STRING_NEW: &str = "String.new";

/// Runtime routine that appends a character to a string, returning the string.
pub const STRING_APPEND: &str = "String.appendChar";

/// `pointer` slot bound to the current object.
pub const RECEIVER_REGISTER: u16 = 0;

/// `pointer` slot bound to the indirect-addressing target.
pub const INDIRECT_REGISTER: u16 = 1;

/// `temp` slot used for staging values and discarding call results.
pub const SCRATCH: u16 = 0;
