use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Instruction tags of the script VM, keyed by their encoded byte.
///
/// The table is closed: every tag the VM defines is listed, whether or not the
/// expression parser models its operands. Bytes without an entry decode to
/// [`Token::Unknown`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    FromRepr,
    EnumIter,
    EnumCount,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum Opcode {
    LocalVariable = 0x00,
    InstanceVariable = 0x01,
    DefaultVariable = 0x02,
    Return = 0x04,
    Jump = 0x06,
    JumpIfNot = 0x07,
    Assert = 0x09,
    Nothing = 0x0B,
    Let = 0x0F,
    ClassContext = 0x12,
    MetaCast = 0x13,
    LetBool = 0x14,
    EndParmValue = 0x15,
    EndFunctionParms = 0x16,
    #[strum(serialize = "Self")]
    SelfRef = 0x17,
    Skip = 0x18,
    Context = 0x19,
    #[strum(serialize = "Context_FailSilent")]
    ContextFailSilent = 0x1A,
    VirtualFunction = 0x1B,
    FinalFunction = 0x1C,
    IntConst = 0x1D,
    FloatConst = 0x1E,
    StringConst = 0x1F,
    ObjectConst = 0x20,
    NameConst = 0x21,
    RotationConst = 0x22,
    VectorConst = 0x23,
    ByteConst = 0x24,
    IntZero = 0x25,
    IntOne = 0x26,
    True = 0x27,
    False = 0x28,
    NoObject = 0x2A,
    TransformConst = 0x2B,
    TextConst = 0x2C,
    IntConstByte = 0x2D,
    NoInterface = 0x2E,
    DynamicCast = 0x2F,
    StructConst = 0x30,
    EndStructConst = 0x31,
    SetArray = 0x32,
    EndArray = 0x33,
    PropertyConst = 0x34,
    UnicodeStringConst = 0x35,
    Int64Const = 0x36,
    UInt64Const = 0x37,
    DoubleConst = 0x38,
    SetSet = 0x39,
    EndSet = 0x3A,
    SetMap = 0x3B,
    EndMap = 0x3C,
    SetConst = 0x3D,
    EndSetConst = 0x3E,
    MapConst = 0x3F,
    EndMapConst = 0x40,
    StructMemberContext = 0x42,
    LetMulticastDelegate = 0x43,
    LetDelegate = 0x44,
    LocalVirtualFunction = 0x45,
    LocalFinalFunction = 0x46,
    LocalOutVariable = 0x48,
    DeprecatedOp4A = 0x4A,
    InstanceDelegate = 0x4B,
    PushExecutionFlow = 0x4C,
    PopExecutionFlow = 0x4D,
    ComputedJump = 0x4E,
    PopExecutionFlowIfNot = 0x4F,
    Breakpoint = 0x50,
    InterfaceContext = 0x51,
    ObjToInterfaceCast = 0x52,
    EndOfScript = 0x53,
    CrossInterfaceCast = 0x54,
    InterfaceToObjCast = 0x55,
    WireTracepoint = 0x5A,
    SkipOffsetConst = 0x5B,
    AddMulticastDelegate = 0x5C,
    ClearMulticastDelegate = 0x5D,
    Tracepoint = 0x5E,
    LetObj = 0x5F,
    LetWeakObjPtr = 0x60,
    BindDelegate = 0x61,
    RemoveMulticastDelegate = 0x62,
    CallMulticastDelegate = 0x63,
    LetValueOnPersistentFrame = 0x64,
    ArrayConst = 0x65,
    EndArrayConst = 0x66,
    SoftObjectConst = 0x67,
    CallMath = 0x68,
    SwitchValue = 0x69,
    InstrumentationEvent = 0x6A,
    ArrayGetByRef = 0x6B,
    ClassSparseDataVariable = 0x6C,
    FieldPathConst = 0x6D,
}

impl Opcode {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Tags that only close an enclosing aggregate and carry no operands.
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::EndFunctionParms
                | Opcode::EndStructConst
                | Opcode::EndArray
                | Opcode::EndArrayConst
                | Opcode::EndOfScript
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded token byte: a tabled opcode, or the raw byte when the table has
/// no entry for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Op(Opcode),
    Unknown(u8),
}

impl Token {
    pub fn from_byte(b: u8) -> Self {
        Opcode::from_repr(b).map_or(Token::Unknown(b), Token::Op)
    }

    pub fn byte(self) -> u8 {
        match self {
            Token::Op(op) => op.byte(),
            Token::Unknown(b) => b,
        }
    }

    pub fn is(self, op: Opcode) -> bool {
        self == Token::Op(op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Op(op) => write!(f, "{op}"),
            Token::Unknown(b) => write!(f, "Unknown(0x{b:02X})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test]
    fn every_byte_decodes() {
        for b in 0..=u8::MAX {
            assert_eq!(Token::from_byte(b).byte(), b);
        }
    }

    #[test]
    fn table_round_trips_through_repr() {
        assert_eq!(Opcode::iter().count(), Opcode::COUNT);
        for op in Opcode::iter() {
            assert_eq!(Token::from_byte(op.byte()), Token::Op(op));
        }
    }

    #[test_case(0x03; "gap after default variable")]
    #[test_case(0x41; "gap before struct member context")]
    #[test_case(0x6E; "past the last tag")]
    #[test_case(0xFF; "max byte")]
    fn gaps_are_unknown(b: u8) {
        assert_eq!(Token::from_byte(b), Token::Unknown(b));
    }

    #[test_case(Opcode::SelfRef, "Self")]
    #[test_case(Opcode::ContextFailSilent, "Context_FailSilent")]
    #[test_case(Opcode::FinalFunction, "FinalFunction")]
    fn names(op: Opcode, name: &str) {
        assert_eq!(op.name(), name);
        assert_eq!(Token::Op(op).to_string(), name);
    }

    #[test]
    fn unknown_display() {
        assert_eq!(Token::Unknown(0x7f).to_string(), "Unknown(0x7F)");
    }
}
