//! Opcode constants and the per-opcode static metadata the dispatch table
//! is assembled from.

use primitives::hardfork::SpecId;

/// Static description of one opcode slot.
///
/// The dispatcher checks `enabled_in`, the stack lower bound and the stack
/// growth bound before invoking a handler, so handlers can rely on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    /// Number of stack items the opcode pops (minimum stack depth).
    pub inputs: u8,
    /// Number of stack items the opcode pushes.
    pub outputs: u8,
    /// First hardfork the opcode exists in.
    pub enabled_in: SpecId,
    /// Whether the opcode ends execution of the frame.
    pub terminating: bool,
}

impl OpInfo {
    /// Metadata for an opcode available since Frontier.
    pub const fn new(inputs: u8, outputs: u8) -> Self {
        Self {
            inputs,
            outputs,
            enabled_in: SpecId::FRONTIER,
            terminating: false,
        }
    }

    /// Sets the first hardfork the opcode is available in.
    pub const fn from(mut self, spec_id: SpecId) -> Self {
        self.enabled_in = spec_id;
        self
    }

    /// Marks the opcode as terminating.
    pub const fn terminating(mut self) -> Self {
        self.terminating = true;
        self
    }

    /// Metadata for an unassigned opcode byte.
    pub const fn unknown() -> Self {
        Self::new(0, 0).terminating()
    }
}

macro_rules! opcodes {
    ($($val:literal => $name:ident => $info:expr),* $(,)?) => {
        $(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name), "\") opcode.")]
            pub const $name: u8 = $val;
        )*

        /// Maps each opcode to its name; `None` for unassigned bytes.
        pub const OPCODE_NAMES: [Option<&'static str>; 256] = {
            let mut map = [None; 256];
            $(
                map[$val] = Some(stringify!($name));
            )*
            map
        };

        /// Maps each opcode to its static metadata.
        pub const OPCODE_INFO: [OpInfo; 256] = {
            let mut map = [OpInfo::unknown(); 256];
            $(
                map[$val] = $info;
            )*
            map
        };
    };
}

opcodes! {
    0x00 => STOP => OpInfo::new(0, 0).terminating(),

    0x01 => ADD        => OpInfo::new(2, 1),
    0x02 => MUL        => OpInfo::new(2, 1),
    0x03 => SUB        => OpInfo::new(2, 1),
    0x04 => DIV        => OpInfo::new(2, 1),
    0x05 => SDIV       => OpInfo::new(2, 1),
    0x06 => MOD        => OpInfo::new(2, 1),
    0x07 => SMOD       => OpInfo::new(2, 1),
    0x08 => ADDMOD     => OpInfo::new(3, 1),
    0x09 => MULMOD     => OpInfo::new(3, 1),
    0x0A => EXP        => OpInfo::new(2, 1),
    0x0B => SIGNEXTEND => OpInfo::new(2, 1),

    0x10 => LT     => OpInfo::new(2, 1),
    0x11 => GT     => OpInfo::new(2, 1),
    0x12 => SLT    => OpInfo::new(2, 1),
    0x13 => SGT    => OpInfo::new(2, 1),
    0x14 => EQ     => OpInfo::new(2, 1),
    0x15 => ISZERO => OpInfo::new(1, 1),
    0x16 => AND    => OpInfo::new(2, 1),
    0x17 => OR     => OpInfo::new(2, 1),
    0x18 => XOR    => OpInfo::new(2, 1),
    0x19 => NOT    => OpInfo::new(1, 1),
    0x1A => BYTE   => OpInfo::new(2, 1),
    0x1B => SHL    => OpInfo::new(2, 1).from(SpecId::CONSTANTINOPLE),
    0x1C => SHR    => OpInfo::new(2, 1).from(SpecId::CONSTANTINOPLE),
    0x1D => SAR    => OpInfo::new(2, 1).from(SpecId::CONSTANTINOPLE),

    0x20 => KECCAK256 => OpInfo::new(2, 1),

    0x30 => ADDRESS      => OpInfo::new(0, 1),
    0x31 => BALANCE      => OpInfo::new(1, 1),
    0x32 => ORIGIN       => OpInfo::new(0, 1),
    0x33 => CALLER       => OpInfo::new(0, 1),
    0x34 => CALLVALUE    => OpInfo::new(0, 1),
    0x35 => CALLDATALOAD => OpInfo::new(1, 1),
    0x36 => CALLDATASIZE => OpInfo::new(0, 1),
    0x37 => CALLDATACOPY => OpInfo::new(3, 0),
    0x38 => CODESIZE     => OpInfo::new(0, 1),
    0x39 => CODECOPY     => OpInfo::new(3, 0),

    0x3A => GASPRICE       => OpInfo::new(0, 1),
    0x3B => EXTCODESIZE    => OpInfo::new(1, 1),
    0x3C => EXTCODECOPY    => OpInfo::new(4, 0),
    0x3D => RETURNDATASIZE => OpInfo::new(0, 1).from(SpecId::BYZANTIUM),
    0x3E => RETURNDATACOPY => OpInfo::new(3, 0).from(SpecId::BYZANTIUM),
    0x3F => EXTCODEHASH    => OpInfo::new(1, 1).from(SpecId::CONSTANTINOPLE),
    0x40 => BLOCKHASH      => OpInfo::new(1, 1),
    0x41 => COINBASE       => OpInfo::new(0, 1),
    0x42 => TIMESTAMP      => OpInfo::new(0, 1),
    0x43 => NUMBER         => OpInfo::new(0, 1),
    0x44 => DIFFICULTY     => OpInfo::new(0, 1),
    0x45 => GASLIMIT       => OpInfo::new(0, 1),
    0x46 => CHAINID        => OpInfo::new(0, 1).from(SpecId::ISTANBUL),
    0x47 => SELFBALANCE    => OpInfo::new(0, 1).from(SpecId::ISTANBUL),
    0x48 => BASEFEE        => OpInfo::new(0, 1).from(SpecId::LONDON),
    0x49 => BLOBHASH       => OpInfo::new(1, 1).from(SpecId::CANCUN),
    0x4A => BLOBBASEFEE    => OpInfo::new(0, 1).from(SpecId::CANCUN),

    0x50 => POP      => OpInfo::new(1, 0),
    0x51 => MLOAD    => OpInfo::new(1, 1),
    0x52 => MSTORE   => OpInfo::new(2, 0),
    0x53 => MSTORE8  => OpInfo::new(2, 0),
    0x54 => SLOAD    => OpInfo::new(1, 1),
    0x55 => SSTORE   => OpInfo::new(2, 0),
    0x56 => JUMP     => OpInfo::new(1, 0),
    0x57 => JUMPI    => OpInfo::new(2, 0),
    0x58 => PC       => OpInfo::new(0, 1),
    0x59 => MSIZE    => OpInfo::new(0, 1),
    0x5A => GAS      => OpInfo::new(0, 1),
    0x5B => JUMPDEST => OpInfo::new(0, 0),
    0x5C => TLOAD    => OpInfo::new(1, 1).from(SpecId::CANCUN),
    0x5D => TSTORE   => OpInfo::new(2, 0).from(SpecId::CANCUN),
    0x5E => MCOPY    => OpInfo::new(3, 0).from(SpecId::CANCUN),

    0x5F => PUSH0  => OpInfo::new(0, 1).from(SpecId::SHANGHAI),
    0x60 => PUSH1  => OpInfo::new(0, 1),
    0x61 => PUSH2  => OpInfo::new(0, 1),
    0x62 => PUSH3  => OpInfo::new(0, 1),
    0x63 => PUSH4  => OpInfo::new(0, 1),
    0x64 => PUSH5  => OpInfo::new(0, 1),
    0x65 => PUSH6  => OpInfo::new(0, 1),
    0x66 => PUSH7  => OpInfo::new(0, 1),
    0x67 => PUSH8  => OpInfo::new(0, 1),
    0x68 => PUSH9  => OpInfo::new(0, 1),
    0x69 => PUSH10 => OpInfo::new(0, 1),
    0x6A => PUSH11 => OpInfo::new(0, 1),
    0x6B => PUSH12 => OpInfo::new(0, 1),
    0x6C => PUSH13 => OpInfo::new(0, 1),
    0x6D => PUSH14 => OpInfo::new(0, 1),
    0x6E => PUSH15 => OpInfo::new(0, 1),
    0x6F => PUSH16 => OpInfo::new(0, 1),
    0x70 => PUSH17 => OpInfo::new(0, 1),
    0x71 => PUSH18 => OpInfo::new(0, 1),
    0x72 => PUSH19 => OpInfo::new(0, 1),
    0x73 => PUSH20 => OpInfo::new(0, 1),
    0x74 => PUSH21 => OpInfo::new(0, 1),
    0x75 => PUSH22 => OpInfo::new(0, 1),
    0x76 => PUSH23 => OpInfo::new(0, 1),
    0x77 => PUSH24 => OpInfo::new(0, 1),
    0x78 => PUSH25 => OpInfo::new(0, 1),
    0x79 => PUSH26 => OpInfo::new(0, 1),
    0x7A => PUSH27 => OpInfo::new(0, 1),
    0x7B => PUSH28 => OpInfo::new(0, 1),
    0x7C => PUSH29 => OpInfo::new(0, 1),
    0x7D => PUSH30 => OpInfo::new(0, 1),
    0x7E => PUSH31 => OpInfo::new(0, 1),
    0x7F => PUSH32 => OpInfo::new(0, 1),

    0x80 => DUP1  => OpInfo::new(1, 2),
    0x81 => DUP2  => OpInfo::new(2, 3),
    0x82 => DUP3  => OpInfo::new(3, 4),
    0x83 => DUP4  => OpInfo::new(4, 5),
    0x84 => DUP5  => OpInfo::new(5, 6),
    0x85 => DUP6  => OpInfo::new(6, 7),
    0x86 => DUP7  => OpInfo::new(7, 8),
    0x87 => DUP8  => OpInfo::new(8, 9),
    0x88 => DUP9  => OpInfo::new(9, 10),
    0x89 => DUP10 => OpInfo::new(10, 11),
    0x8A => DUP11 => OpInfo::new(11, 12),
    0x8B => DUP12 => OpInfo::new(12, 13),
    0x8C => DUP13 => OpInfo::new(13, 14),
    0x8D => DUP14 => OpInfo::new(14, 15),
    0x8E => DUP15 => OpInfo::new(15, 16),
    0x8F => DUP16 => OpInfo::new(16, 17),

    0x90 => SWAP1  => OpInfo::new(2, 2),
    0x91 => SWAP2  => OpInfo::new(3, 3),
    0x92 => SWAP3  => OpInfo::new(4, 4),
    0x93 => SWAP4  => OpInfo::new(5, 5),
    0x94 => SWAP5  => OpInfo::new(6, 6),
    0x95 => SWAP6  => OpInfo::new(7, 7),
    0x96 => SWAP7  => OpInfo::new(8, 8),
    0x97 => SWAP8  => OpInfo::new(9, 9),
    0x98 => SWAP9  => OpInfo::new(10, 10),
    0x99 => SWAP10 => OpInfo::new(11, 11),
    0x9A => SWAP11 => OpInfo::new(12, 12),
    0x9B => SWAP12 => OpInfo::new(13, 13),
    0x9C => SWAP13 => OpInfo::new(14, 14),
    0x9D => SWAP14 => OpInfo::new(15, 15),
    0x9E => SWAP15 => OpInfo::new(16, 16),
    0x9F => SWAP16 => OpInfo::new(17, 17),

    0xA0 => LOG0 => OpInfo::new(2, 0),
    0xA1 => LOG1 => OpInfo::new(3, 0),
    0xA2 => LOG2 => OpInfo::new(4, 0),
    0xA3 => LOG3 => OpInfo::new(5, 0),
    0xA4 => LOG4 => OpInfo::new(6, 0),

    0xF0 => CREATE       => OpInfo::new(3, 1),
    0xF1 => CALL         => OpInfo::new(7, 1),
    0xF2 => CALLCODE     => OpInfo::new(7, 1),
    0xF3 => RETURN       => OpInfo::new(2, 0).terminating(),
    0xF4 => DELEGATECALL => OpInfo::new(6, 1).from(SpecId::HOMESTEAD),
    0xF5 => CREATE2      => OpInfo::new(4, 1).from(SpecId::PETERSBURG),
    0xFA => STATICCALL   => OpInfo::new(6, 1).from(SpecId::BYZANTIUM),
    0xFD => REVERT       => OpInfo::new(2, 0).from(SpecId::BYZANTIUM).terminating(),
    0xFE => INVALID      => OpInfo::new(0, 0).terminating(),
    0xFF => SELFDESTRUCT => OpInfo::new(1, 0).terminating(),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_info_line_up() {
        assert_eq!(OPCODE_NAMES[STOP as usize], Some("STOP"));
        assert_eq!(OPCODE_NAMES[SELFDESTRUCT as usize], Some("SELFDESTRUCT"));
        assert_eq!(OPCODE_NAMES[0x0C], None);
        assert_eq!(OPCODE_INFO[CALL as usize].inputs, 7);
        assert_eq!(OPCODE_INFO[SWAP16 as usize].inputs, 17);
        assert_eq!(OPCODE_INFO[PUSH0 as usize].enabled_in, SpecId::SHANGHAI);
        assert!(OPCODE_INFO[REVERT as usize].terminating);
        assert!(OPCODE_INFO[0xEF].terminating);
    }
}
