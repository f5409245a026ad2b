//! Virtual machine instructions and the writer that serializes them.
use std::{
    fmt,
    io::{self, Write},
};

use smol_str::SmolStr;

/// Addressable memory segments of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    /// Fields of the current object.
    This,
    /// Memory behind the indirect-addressing register.
    That,
    /// `pointer 0` is the receiver register, `pointer 1` the
    /// indirect-addressing register.
    Pointer,
    Temp,
    Static,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Local    => write!(f, "local"),
            Self::Argument => write!(f, "argument"),
            Self::This     => write!(f, "this"),
            Self::That     => write!(f, "that"),
            Self::Pointer  => write!(f, "pointer"),
            Self::Temp     => write!(f, "temp"),
            Self::Static   => write!(f, "static"),
        }
    }
}

/// Arithmetic and logical operations native to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Sub => write!(f, "sub"),
            Self::Neg => write!(f, "neg"),
            Self::Eq  => write!(f, "eq"),
            Self::Gt  => write!(f, "gt"),
            Self::Lt  => write!(f, "lt"),
            Self::And => write!(f, "and"),
            Self::Or  => write!(f, "or"),
            Self::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Push(Segment, u16),
    Pop(Segment, u16),
    Arithmetic(ArithOp),
    Label(SmolStr),
    Goto(SmolStr),
    IfGoto(SmolStr),
    Call { name: SmolStr, nargs: u16 },
    Function { name: SmolStr, nlocals: u16 },
    Return,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Push(segment, index) => write!(f, "push {segment} {index}"),
            Self::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            Self::Arithmetic(op) => write!(f, "{op}"),
            Self::Label(name) => write!(f, "label {name}"),
            Self::Goto(name) => write!(f, "goto {name}"),
            Self::IfGoto(name) => write!(f, "if-goto {name}"),
            Self::Call { name, nargs } => write!(f, "call {name} {nargs}"),
            Self::Function { name, nlocals } => write!(f, "function {name} {nlocals}"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Line oriented writer of virtual machine instructions.
///
/// Instructions are written in the order they are requested,
/// without any validation.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Flush and return the underlying output.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    pub fn emit(&mut self, instr: &Instr) -> io::Result<()> {
        writeln!(self.out, "{instr}")
    }

    #[inline]
    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.emit(&Instr::Push(segment, index))
    }

    #[inline]
    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        self.emit(&Instr::Pop(segment, index))
    }

    #[inline]
    pub fn write_arithmetic(&mut self, op: ArithOp) -> io::Result<()> {
        self.emit(&Instr::Arithmetic(op))
    }

    #[inline]
    pub fn write_label(&mut self, label: impl Into<SmolStr>) -> io::Result<()> {
        self.emit(&Instr::Label(label.into()))
    }

    #[inline]
    pub fn write_goto(&mut self, label: impl Into<SmolStr>) -> io::Result<()> {
        self.emit(&Instr::Goto(label.into()))
    }

    #[inline]
    pub fn write_if(&mut self, label: impl Into<SmolStr>) -> io::Result<()> {
        self.emit(&Instr::IfGoto(label.into()))
    }

    #[inline]
    pub fn write_call(&mut self, name: impl Into<SmolStr>, nargs: u16) -> io::Result<()> {
        self.emit(&Instr::Call {
            name: name.into(),
            nargs,
        })
    }

    #[inline]
    pub fn write_function(&mut self, name: impl Into<SmolStr>, nlocals: u16) -> io::Result<()> {
        self.emit(&Instr::Function {
            name: name.into(),
            nlocals,
        })
    }

    #[inline]
    pub fn write_return(&mut self) -> io::Result<()> {
        self.emit(&Instr::Return)
    }

    /// Comment line, ignored by the machine.
    pub fn write_comment(&mut self, text: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "// {text}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_instruction_lines() {
        let mut writer = VmWriter::new(Vec::new());
        writer.write_function("Main.main", 2).unwrap();
        writer.write_push(Segment::Constant, 7).unwrap();
        writer.write_pop(Segment::That, 0).unwrap();
        writer.write_arithmetic(ArithOp::Not).unwrap();
        writer.write_label("Main.main$WHILE_EXP0").unwrap();
        writer.write_if("Main.main$WHILE_END0").unwrap();
        writer.write_goto("Main.main$WHILE_EXP0").unwrap();
        writer.write_call("Math.multiply", 2).unwrap();
        writer.write_return().unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "function Main.main 2\n\
             push constant 7\n\
             pop that 0\n\
             not\n\
             label Main.main$WHILE_EXP0\n\
             if-goto Main.main$WHILE_END0\n\
             goto Main.main$WHILE_EXP0\n\
             call Math.multiply 2\n\
             return\n"
        );
    }

    #[test]
    fn test_segment_names() {
        let names = [
            Segment::Constant,
            Segment::Local,
            Segment::Argument,
            Segment::This,
            Segment::That,
            Segment::Pointer,
            Segment::Temp,
            Segment::Static,
        ]
        .iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>();

        assert_eq!(
            names,
            vec!["constant", "local", "argument", "this", "that", "pointer", "temp", "static"]
        );
    }
}
