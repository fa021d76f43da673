#![allow(dead_code)]

use bpdecomp_lib::Opcode;

/// Assembles script bytes for tests.
#[derive(Default)]
pub struct Script {
    bytes: Vec<u8>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, op: Opcode) -> Self {
        self.bytes.push(op.byte());
        self
    }

    pub fn byte(mut self, b: u8) -> Self {
        self.bytes.push(b);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn reference(mut self, v: u64) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn ascii(mut self, s: &str) -> Self {
        self.bytes.extend_from_slice(s.as_bytes());
        self.bytes.push(0);
        self
    }

    pub fn int(self, v: i32) -> Self {
        self.op(Opcode::IntConst).i32(v)
    }

    pub fn local(self, reference: u64) -> Self {
        self.op(Opcode::LocalVariable).reference(reference)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
