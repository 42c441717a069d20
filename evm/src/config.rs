/// How `CREATE` derives the address of the new contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum CreateScheme {
    /// `keccak256(rlp([sender, nonce]))[12..]`.
    #[default]
    Legacy,
    /// `keccak256(sender ++ init_code)[12..]`.
    ///
    /// The nonce plays no part, so the same sender deploying the same init
    /// code twice targets the same address. The second creation is handled
    /// like any collision: the existing account keeps its balance while its
    /// nonce, code and storage are wiped before the init code runs again.
    Hashed,
}

/// Protocol parameters and switches of the engine.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Config {
    /// Extra gas charged by `BALANCE`.
    pub gas_balance_supplemental: u64,
    /// Extra gas charged by `EXTCODESIZE` and `EXTCODECOPY`.
    pub gas_ext_code_supplemental: u64,
    /// Extra gas charged by `SLOAD`.
    pub gas_sload_supplemental: u64,
    /// Extra gas charged by `CALL`, `CALLCODE` and `DELEGATECALL`.
    pub gas_call_supplemental: u64,
    /// Extra gas charged by `SELFDESTRUCT`.
    pub gas_suicide_supplemental: u64,
    /// Extra gas charged by `SELFDESTRUCT` to a beneficiary that does not
    /// exist yet.
    pub gas_suicide_new_account: u64,
    /// Forward at most all but one 64th of the remaining gas to calls and
    /// creates, instead of failing calls that ask for more than available.
    pub call_l64_after_gas: bool,
    /// A creation that cannot pay the code deposit fails. When unset the
    /// contract is created with empty code instead.
    pub create_code_deposit_oog_fails: bool,
    /// Has `DELEGATECALL`.
    pub has_delegate_call: bool,
    /// Has `REVERT`.
    pub has_revert: bool,
    /// Address derivation of `CREATE`.
    pub create_scheme: CreateScheme,
    /// Maximum call depth. A call or create at this depth fails softly.
    pub call_stack_limit: usize,
}

impl Config {
    /// Frontier hard fork configuration.
    #[must_use]
    pub const fn frontier() -> Self {
        Self {
            gas_balance_supplemental: 0,
            gas_ext_code_supplemental: 0,
            gas_sload_supplemental: 0,
            gas_call_supplemental: 0,
            gas_suicide_supplemental: 0,
            gas_suicide_new_account: 0,
            call_l64_after_gas: false,
            create_code_deposit_oog_fails: false,
            has_delegate_call: false,
            has_revert: false,
            create_scheme: CreateScheme::Legacy,
            call_stack_limit: 1024,
        }
    }

    /// Homestead hard fork configuration.
    #[must_use]
    pub const fn homestead() -> Self {
        Self {
            create_code_deposit_oog_fails: true,
            has_delegate_call: true,
            ..Self::frontier()
        }
    }

    /// Tangerine Whistle (EIP-150) hard fork configuration.
    #[must_use]
    pub const fn tangerine() -> Self {
        Self {
            gas_balance_supplemental: 380,
            gas_ext_code_supplemental: 680,
            gas_sload_supplemental: 150,
            gas_call_supplemental: 660,
            gas_suicide_supplemental: 5000,
            gas_suicide_new_account: 25000,
            call_l64_after_gas: true,
            ..Self::homestead()
        }
    }

    /// Enable `REVERT`.
    #[must_use]
    pub const fn with_revert(mut self) -> Self {
        self.has_revert = true;
        self
    }

    /// Select the `CREATE` address derivation.
    #[must_use]
    pub const fn with_create_scheme(mut self, scheme: CreateScheme) -> Self {
        self.create_scheme = scheme;
        self
    }

    /// Limit the call depth.
    #[must_use]
    pub const fn with_call_stack_limit(mut self, limit: usize) -> Self {
        self.call_stack_limit = limit;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::homestead()
    }
}
