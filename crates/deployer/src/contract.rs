//! Runtime ABI encoding and decoding for the compiled contract.

use {
    crate::error::LookupError,
    alloy::{
        dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Specifier},
        json_abi::{Function, JsonAbi, Param},
        primitives::Bytes,
    },
    solc::CompiledContract,
};

/// Creation code for `contract`: the bytecode followed by the ABI encoded
/// constructor arguments.
pub fn deploy_code(contract: &CompiledContract, args: &[String]) -> Result<Bytes, LookupError> {
    let Some(constructor) = contract.abi.constructor() else {
        if !args.is_empty() {
            return Err(LookupError::Arguments {
                target: "constructor".to_string(),
                reason: format!("contract takes no arguments but {} were given", args.len()),
            });
        }
        return Ok(contract.bytecode.clone());
    };
    let values = coerce("constructor", &constructor.inputs, args)?;
    let encoded = constructor
        .abi_encode_input(&values)
        .map_err(|err| LookupError::Arguments {
            target: "constructor".to_string(),
            reason: err.to_string(),
        })?;
    Ok([contract.bytecode.as_ref(), &encoded].concat().into())
}

/// A function of the ABI together with the arguments to call it with.
#[derive(Debug, Clone)]
pub struct Call {
    pub function: Function,
    pub calldata: Bytes,
}

impl Call {
    /// Looks up `name` in `abi` and encodes `args` for it. With overloaded
    /// functions the first one taking `args.len()` parameters is used.
    pub fn new(abi: &JsonAbi, name: &str, args: &[String]) -> Result<Self, LookupError> {
        let function = abi
            .function(name)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|function| function.inputs.len() == args.len())
                    .or_else(|| overloads.first())
            })
            .ok_or_else(|| LookupError::Function(name.to_string()))?;
        let values = coerce(&function.signature(), &function.inputs, args)?;
        let calldata = function
            .abi_encode_input(&values)
            .map_err(|err| LookupError::Arguments {
                target: function.signature(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            function: function.clone(),
            calldata: calldata.into(),
        })
    }

    pub fn signature(&self) -> String {
        self.function.signature()
    }

    /// Decodes the return data of an `eth_call` of this function.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<DynSolValue>, LookupError> {
        self.function
            .abi_decode_output(data)
            .map_err(|err| LookupError::Output {
                function: self.signature(),
                reason: err.to_string(),
            })
    }
}

/// Parses textual arguments into values of the parameter types.
fn coerce(target: &str, params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>, LookupError> {
    let invalid = |reason: String| LookupError::Arguments {
        target: target.to_string(),
        reason,
    };
    if params.len() != args.len() {
        return Err(invalid(format!(
            "expected {} arguments but {} were given",
            params.len(),
            args.len()
        )));
    }
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param
                .resolve()
                .map_err(|err| invalid(format!("{}: {err}", param.name)))?;
            ty.coerce_str(arg.trim())
                .map_err(|err| invalid(format!("{:?} is not a valid {ty}: {err}", arg)))
        })
        .collect()
}

/// Human readable rendering of decoded values, e.g. `81` or `(1, "a")`.
pub fn display(values: &[DynSolValue]) -> String {
    values.iter().map(display_value).collect::<Vec<_>>().join(", ")
}

fn display_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(address) => address.to_checksum(None),
        DynSolValue::FixedBytes(word, size) => const_hex::encode_prefixed(&word[..*size]),
        DynSolValue::Bytes(bytes) => const_hex::encode_prefixed(bytes),
        DynSolValue::String(s) => format!("{s:?}"),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
            format!("[{}]", display(values))
        }
        DynSolValue::Tuple(values) => format!("({})", display(values)),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use {
        super::*,
        alloy::primitives::{Address, U256},
    };

    pub fn simple_storage() -> CompiledContract {
        let abi = serde_json::from_str(
            r#"[
                {
                    "inputs": [
                        { "internalType": "string", "name": "_name", "type": "string" },
                        { "internalType": "uint256", "name": "_favoriteNumber", "type": "uint256" }
                    ],
                    "name": "addPerson",
                    "outputs": [],
                    "stateMutability": "nonpayable",
                    "type": "function"
                },
                {
                    "inputs": [],
                    "name": "retrieve",
                    "outputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
                    "stateMutability": "view",
                    "type": "function"
                },
                {
                    "inputs": [{ "internalType": "uint256", "name": "_favoriteNumber", "type": "uint256" }],
                    "name": "store",
                    "outputs": [],
                    "stateMutability": "nonpayable",
                    "type": "function"
                }
            ]"#,
        )
        .unwrap();
        CompiledContract {
            name: "SimpleStorage".to_string(),
            bytecode: Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]),
            abi,
        }
    }

    fn with_constructor() -> CompiledContract {
        let abi = serde_json::from_str(
            r#"[{
                "inputs": [
                    { "internalType": "address", "name": "owner", "type": "address" },
                    { "internalType": "uint256", "name": "initial", "type": "uint256" }
                ],
                "stateMutability": "nonpayable",
                "type": "constructor"
            }]"#,
        )
        .unwrap();
        CompiledContract {
            abi,
            ..simple_storage()
        }
    }

    #[test]
    fn deploy_code_without_constructor_is_the_bytecode() {
        let contract = simple_storage();
        assert_eq!(deploy_code(&contract, &[]).unwrap(), contract.bytecode);
        assert!(matches!(
            deploy_code(&contract, &["1".to_string()]),
            Err(LookupError::Arguments { .. })
        ));
    }

    #[test]
    fn appends_constructor_arguments() {
        let contract = with_constructor();
        let args = [
            "0x0000000000000000000000000000000000000001".to_string(),
            "81".to_string(),
        ];
        let code = deploy_code(&contract, &args).unwrap();

        assert_eq!(code.len(), contract.bytecode.len() + 64);
        assert_eq!(&code[..contract.bytecode.len()], &contract.bytecode[..]);
        assert_eq!(code[contract.bytecode.len() + 31], 1);
        assert_eq!(code[code.len() - 1], 81);

        assert!(deploy_code(&contract, &args[..1]).is_err());
        assert!(deploy_code(&contract, &["owner".to_string(), "81".to_string()]).is_err());
    }

    #[test]
    fn encodes_function_calls() {
        let store = Call::new(&simple_storage().abi, "store", &["81".to_string()]).unwrap();
        assert_eq!(store.signature(), "store(uint256)");
        // keccak256("store(uint256)")[..4]
        assert_eq!(&store.calldata[..4], &[0x60, 0x57, 0x36, 0x1d]);
        assert_eq!(
            U256::from_be_slice(&store.calldata[4..]),
            U256::from(81)
        );

        let retrieve = Call::new(&simple_storage().abi, "retrieve", &[]).unwrap();
        // keccak256("retrieve()")[..4]
        assert_eq!(&retrieve.calldata[..], &[0x2e, 0x64, 0xce, 0xc1]);
    }

    #[test]
    fn rejects_unknown_functions_and_bad_arguments() {
        let abi = simple_storage().abi;
        assert!(matches!(
            Call::new(&abi, "missing", &[]),
            Err(LookupError::Function(_))
        ));
        assert!(matches!(
            Call::new(&abi, "store", &[]),
            Err(LookupError::Arguments { .. })
        ));
        assert!(matches!(
            Call::new(&abi, "store", &["-1".to_string()]),
            Err(LookupError::Arguments { .. })
        ));
    }

    #[test]
    fn decodes_and_displays_outputs() {
        let retrieve = Call::new(&simple_storage().abi, "retrieve", &[]).unwrap();
        let values = retrieve.decode(&U256::from(81).to_be_bytes::<32>()).unwrap();
        assert_eq!(display(&values), "81");

        assert!(matches!(
            retrieve.decode(&[0x01]),
            Err(LookupError::Output { .. })
        ));
    }

    #[test]
    fn displays_composite_values() {
        let values = [
            DynSolValue::Tuple(vec![
                DynSolValue::String("Alice".to_string()),
                DynSolValue::Uint(U256::from(7), 256),
            ]),
            DynSolValue::Array(vec![DynSolValue::Bool(true), DynSolValue::Bool(false)]),
            DynSolValue::Address(Address::ZERO),
        ];
        assert_eq!(
            display(&values),
            "(\"Alice\", 7), [true, false], 0x0000000000000000000000000000000000000000"
        );
    }
}
