use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::opcode::{Opcode, Token};
use crate::reader::Reader;
use crate::resolve::NameResolver;

/// Deepest nesting level that is still decoded. Anything below it renders as
/// [`TRUNCATED`].
pub const MAX_DEPTH: u32 = 64;

pub const TRUNCATED: &str = "/* truncated */";

/// Context and class-context carry a skip offset (u32) and a property type
/// tag (u8) before the member reference. Neither is rendered.
const CONTEXT_HEADER_LEN: usize = 4 + 1;

/// Rotation quaternion, translation and scale.
const TRANSFORM_LEN: usize = 4 * 10;

/// One opcode dispatch recorded while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub offset: usize,
    pub depth: u32,
    pub token: Token,
}

/// Recursive-descent renderer for a single expression and everything nested
/// in it.
pub struct ExprParser<'a> {
    resolver: &'a dyn NameResolver,
    visits: Option<Vec<Visit>>,
}

impl<'a> ExprParser<'a> {
    pub fn new(resolver: &'a dyn NameResolver) -> Self {
        Self { resolver, visits: None }
    }

    /// Like [`new`](Self::new), but also records every opcode the parser
    /// dispatches on.
    pub fn with_trace(resolver: &'a dyn NameResolver) -> Self {
        Self { resolver, visits: Some(Vec::new()) }
    }

    pub fn take_visits(&mut self) -> Vec<Visit> {
        self.visits.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Consumes exactly one expression starting at the cursor and returns its
    /// pseudocode.
    pub fn parse_expression(&mut self, r: &mut Reader<'_>, depth: u32) -> String {
        if !r.has_more() {
            debug!(offset = r.position(), depth, "expression runs past end of script");
            return TRUNCATED.into();
        }
        if depth > MAX_DEPTH {
            warn!(offset = r.position(), depth, "expression nesting too deep");
            return TRUNCATED.into();
        }

        let offset = r.position();
        let token = r.get_token();
        if let Some(visits) = self.visits.as_mut() {
            visits.push(Visit { offset, depth, token });
        }

        let op = match token {
            Token::Op(op) => op,
            Token::Unknown(b) => return unknown(offset, b),
        };

        match op {
            Opcode::IntConst => r.get_i32().to_string(),
            Opcode::FloatConst => format!("{:.4}f", r.get_f32()),
            Opcode::DoubleConst => format!("{:.6}", r.get_f64()),
            Opcode::StringConst => format!("\"{}\"", r.get_ascii_string()),
            Opcode::UnicodeStringConst => format!("L\"{}\"", r.get_utf16_string()),
            Opcode::ByteConst | Opcode::IntConstByte => r.get_u8().to_string(),
            Opcode::Int64Const => format!("{}LL", r.get_i64()),
            Opcode::UInt64Const => format!("{}ULL", r.get_u64()),
            Opcode::IntZero => "0".into(),
            Opcode::IntOne => "1".into(),
            Opcode::True => "true".into(),
            Opcode::False => "false".into(),
            Opcode::NoObject | Opcode::NoInterface => "nullptr".into(),
            Opcode::SelfRef => "this".into(),
            Opcode::Nothing => String::new(),

            Opcode::LocalVariable
            | Opcode::LocalOutVariable
            | Opcode::InstanceVariable
            | Opcode::DefaultVariable
            | Opcode::ObjectConst => self.name(r),
            Opcode::NameConst => format!("Name(\"{}\")", r.get_ascii_string()),
            Opcode::SoftObjectConst => format!("SoftObject({})", self.sub(r, depth)),

            Opcode::FinalFunction | Opcode::LocalFinalFunction => {
                let callee = self.name(r);
                let args = self.list_until(r, depth, Opcode::EndFunctionParms);
                format!("{callee}({args})")
            }
            Opcode::VirtualFunction | Opcode::LocalVirtualFunction => {
                let callee = r.get_ascii_string();
                let args = self.list_until(r, depth, Opcode::EndFunctionParms);
                format!("{callee}({args})")
            }
            Opcode::CallMath => {
                let callee = self.name(r);
                let args = self.list_until(r, depth, Opcode::EndFunctionParms);
                format!("Math::{callee}({args})")
            }
            Opcode::CallMulticastDelegate => {
                let callee = self.name(r);
                let args = self.list_until(r, depth, Opcode::EndFunctionParms);
                format!("{callee}.Broadcast({args})")
            }

            Opcode::Let
            | Opcode::LetBool
            | Opcode::LetObj
            | Opcode::LetWeakObjPtr
            | Opcode::LetDelegate
            | Opcode::LetMulticastDelegate => {
                // destination property, implied by the destination expression
                r.get_reference();
                let dest = self.sub(r, depth);
                let value = self.sub(r, depth);
                format!("{dest} = {value}")
            }

            Opcode::Jump => format!("goto 0x{:04X}", r.get_u32()),
            Opcode::JumpIfNot => {
                let target = r.get_u32();
                let cond = self.sub(r, depth);
                format!("if (!{cond}) goto 0x{target:04X}")
            }
            Opcode::Return => {
                let value = self.sub(r, depth);
                if value.is_empty() { "return".into() } else { format!("return {value}") }
            }
            Opcode::PushExecutionFlow => format!("/* push flow 0x{:04X} */", r.get_u32()),
            Opcode::PopExecutionFlow => "/* pop flow */".into(),
            Opcode::PopExecutionFlowIfNot => {
                format!("/* pop flow if !{} */", self.sub(r, depth))
            }
            Opcode::ComputedJump => format!("goto [{}]", self.sub(r, depth)),

            Opcode::Context | Opcode::ContextFailSilent | Opcode::ClassContext => {
                let owner = self.sub(r, depth);
                r.skip(CONTEXT_HEADER_LEN);
                r.get_reference();
                let member = self.sub(r, depth);
                let sep = if op == Opcode::ClassContext { "::" } else { "." };
                format!("{owner}{sep}{member}")
            }
            Opcode::InterfaceContext => self.sub(r, depth),
            Opcode::StructMemberContext => {
                let member = self.name(r);
                let owner = self.sub(r, depth);
                format!("{owner}.{member}")
            }

            Opcode::DynamicCast
            | Opcode::ObjToInterfaceCast
            | Opcode::CrossInterfaceCast
            | Opcode::InterfaceToObjCast => {
                let class = self.name(r);
                format!("Cast<{class}>({})", self.sub(r, depth))
            }
            Opcode::MetaCast => {
                let class = self.name(r);
                format!("MetaCast<{class}>({})", self.sub(r, depth))
            }

            Opcode::VectorConst => {
                let (x, y, z) = (r.get_f32(), r.get_f32(), r.get_f32());
                format!("Vector({x:.2}, {y:.2}, {z:.2})")
            }
            Opcode::RotationConst => {
                let (p, y, roll) = (r.get_f32(), r.get_f32(), r.get_f32());
                format!("Rotator({p:.2}, {y:.2}, {roll:.2})")
            }
            Opcode::TransformConst => {
                r.skip(TRANSFORM_LEN);
                "Transform(...)".into()
            }

            Opcode::StructConst => {
                let ty = self.name(r);
                // serialized size of the struct; the field list is self-delimiting
                r.get_i32();
                let fields = self.list_until(r, depth, Opcode::EndStructConst);
                format!("{ty}{{ {fields} }}")
            }

            Opcode::InstanceDelegate | Opcode::BindDelegate => {
                let func = r.get_ascii_string();
                format!("Delegate({func}, {})", self.sub(r, depth))
            }
            Opcode::AddMulticastDelegate => {
                let target = self.sub(r, depth);
                format!("{target}.Add({})", self.sub(r, depth))
            }
            Opcode::RemoveMulticastDelegate => {
                let target = self.sub(r, depth);
                format!("{target}.Remove({})", self.sub(r, depth))
            }
            Opcode::ClearMulticastDelegate => format!("{}.Clear()", self.sub(r, depth)),

            Opcode::Skip => {
                r.get_i32();
                self.sub(r, depth)
            }
            Opcode::SkipOffsetConst => format!("/* skip offset 0x{:04X} */", r.get_u32()),
            Opcode::Assert => {
                let _line = r.get_u16();
                let _in_debug = r.get_u8();
                format!("assert({})", self.sub(r, depth))
            }

            Opcode::SetArray => {
                let target = self.sub(r, depth);
                let elements = self.list_until(r, depth, Opcode::EndArray);
                format!("{target} = [{elements}]")
            }
            Opcode::ArrayGetByRef => {
                let array = self.sub(r, depth);
                format!("{array}[{}]", self.sub(r, depth))
            }

            Opcode::SwitchValue => self.switch_value(r, depth),
            Opcode::TextConst => self.text_const(r, depth),

            op if op.is_terminator() => String::new(),

            _ => unknown(offset, op.byte()),
        }
    }

    fn sub(&mut self, r: &mut Reader<'_>, depth: u32) -> String {
        self.parse_expression(r, depth + 1)
    }

    fn name(&self, r: &mut Reader<'_>) -> String {
        self.resolver.resolve(r.get_reference())
    }

    /// Comma-separated sub-expressions up to `end`. The terminator is consumed
    /// when present; a missing one ends the list at end of script. An element
    /// that consumes nothing (depth limit) also ends the list.
    fn list_until(&mut self, r: &mut Reader<'_>, depth: u32, end: Opcode) -> String {
        let mut items = Vec::new();
        while r.has_more() {
            if r.peek_token().is(end) {
                r.get_token();
                break;
            }
            let start = r.position();
            items.push(self.sub(r, depth));
            if r.position() == start {
                break;
            }
        }
        items.join(", ")
    }

    fn switch_value(&mut self, r: &mut Reader<'_>, depth: u32) -> String {
        let cases = r.get_u16();
        let _end = r.get_u32();
        let index = self.sub(r, depth);
        let mut out = format!("switch ({index}) {{ ");
        for _ in 0..cases {
            let value = self.sub(r, depth);
            let _next = r.get_u32();
            let body = self.sub(r, depth);
            out.push_str(&format!("case {value}: {body}; "));
        }
        let default = self.sub(r, depth);
        out.push_str(&format!("default: {default} }}"));
        out
    }

    fn text_const(&mut self, r: &mut Reader<'_>, depth: u32) -> String {
        match r.get_u8() {
            0 => "EmptyText()".into(),
            1 => {
                let source = self.sub(r, depth);
                let key = self.sub(r, depth);
                let namespace = self.sub(r, depth);
                format!("Localize({namespace}, {key}, {source})")
            }
            2 => format!("InvariantText({})", self.sub(r, depth)),
            // operand layout of the remaining kinds is not modelled; nothing
            // further is consumed
            kind => {
                debug!(offset = r.position(), kind, "unmodelled text literal kind");
                "Text(...)".into()
            }
        }
    }
}

fn unknown(offset: usize, b: u8) -> String {
    debug!(offset, opcode = b, "unknown opcode");
    format!("/* unknown opcode 0x{b:02X} */")
}
