use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

/// Referral code passed to every pool deposit
pub const REFERRAL_CODE: u16 = 0;

// Bindings for the lending pool, its native-currency gateway and the ERC-20 asset
sol! {
    #[allow(missing_docs)]
    interface ILendingPool {
        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);
    }

    #[allow(missing_docs)]
    interface INativeGateway {
        /// The deposited amount travels as the transaction value
        function depositETH(address pool, address onBehalfOf, uint16 referralCode) external payable;
        /// The withdrawn amount travels as an argument
        function withdrawETH(address pool, uint256 amount, address to) external;
    }

    #[allow(missing_docs)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Typed contract call, encoded to calldata only at submission time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Approve {
        spender: Address,
        amount: U256,
    },
    Deposit {
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    },
    Withdraw {
        asset: Address,
        amount: U256,
        to: Address,
    },
    DepositEth {
        pool: Address,
        on_behalf_of: Address,
        referral_code: u16,
    },
    WithdrawEth {
        pool: Address,
        amount: U256,
        to: Address,
    },
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::Approve { .. } => "approve",
            ContractCall::Deposit { .. } => "deposit",
            ContractCall::Withdraw { .. } => "withdraw",
            ContractCall::DepositEth { .. } => "depositETH",
            ContractCall::WithdrawEth { .. } => "withdrawETH",
        }
    }

    /// ABI-encoded calldata (selector + arguments)
    pub fn calldata(&self) -> Bytes {
        let encoded = match self.clone() {
            ContractCall::Approve { spender, amount } => {
                IERC20::approveCall { spender, amount }.abi_encode()
            }
            ContractCall::Deposit {
                asset,
                amount,
                on_behalf_of,
                referral_code,
            } => ILendingPool::depositCall {
                asset,
                amount,
                onBehalfOf: on_behalf_of,
                referralCode: referral_code,
            }
            .abi_encode(),
            ContractCall::Withdraw { asset, amount, to } => {
                ILendingPool::withdrawCall { asset, amount, to }.abi_encode()
            }
            ContractCall::DepositEth {
                pool,
                on_behalf_of,
                referral_code,
            } => INativeGateway::depositETHCall {
                pool,
                onBehalfOf: on_behalf_of,
                referralCode: referral_code,
            }
            .abi_encode(),
            ContractCall::WithdrawEth { pool, amount, to } => {
                INativeGateway::withdrawETHCall { pool, amount, to }.abi_encode()
            }
        };
        Bytes::from(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const POOL: Address = address!("1111111111111111111111111111111111111111");
    const ASSET: Address = address!("2222222222222222222222222222222222222222");
    const ME: Address = address!("3333333333333333333333333333333333333333");

    #[test]
    fn test_approve_selector_and_length() {
        let data = ContractCall::Approve {
            spender: POOL,
            amount: U256::MAX,
        }
        .calldata();
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(data.len(), 4 + 2 * 32);
        assert!(data[36..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_deposit_selector() {
        let data = ContractCall::Deposit {
            asset: ASSET,
            amount: U256::from(1u64),
            on_behalf_of: ME,
            referral_code: REFERRAL_CODE,
        }
        .calldata();
        assert_eq!(&data[..4], &[0xe8, 0xed, 0xa9, 0xdf]);
        assert_eq!(data.len(), 4 + 4 * 32);
    }

    #[test]
    fn test_native_calls_encode_amount_only_on_withdraw() {
        let deposit = ContractCall::DepositEth {
            pool: POOL,
            on_behalf_of: ME,
            referral_code: REFERRAL_CODE,
        }
        .calldata();
        let withdraw = ContractCall::WithdrawEth {
            pool: POOL,
            amount: U256::from(7u64),
            to: ME,
        }
        .calldata();

        assert_eq!(&deposit[..4], &[0x47, 0x4c, 0xf5, 0x3d]);
        assert_eq!(deposit.len(), 4 + 3 * 32);
        assert_eq!(&withdraw[..4], &[0x80, 0x50, 0x0d, 0x20]);
        // second word is the amount
        assert_eq!(withdraw[4 + 32 + 31], 7);
    }

    #[test]
    fn test_method_names() {
        let call = ContractCall::Withdraw {
            asset: ASSET,
            amount: U256::ZERO,
            to: ME,
        };
        assert_eq!(call.method(), "withdraw");
        assert_eq!(&call.calldata()[..4], &[0x69, 0x32, 0x8d, 0xec]);
    }
}
