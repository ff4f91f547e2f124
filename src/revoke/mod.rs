//! Allowance revocation for the known spenders
//!
//! A finite menu-driven utility: pick the pool contract, the native gateway,
//! both, or exit. Each revoke is attempted independently.

pub mod input;

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::allowance::{AllowanceManager, AllowanceReport, AllowanceStatus, SpenderTarget, TargetSelection};
use crate::error::Result;

pub use input::{EditorLineSource, LineSource};

pub const MENU_PROMPT: &str = "Select option (1-4): ";
pub const CONTINUE_PROMPT: &str = "Revoke another? (y/n): ";

/// A parsed menu answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Revoke(TargetSelection),
    Exit,
}

pub fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Revoke(TargetSelection::Pool)),
        "2" => Some(MenuChoice::Revoke(TargetSelection::Native)),
        "3" => Some(MenuChoice::Revoke(TargetSelection::Both)),
        "4" => Some(MenuChoice::Exit),
        _ => None,
    }
}

pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Sets the asset allowance to zero for the pool contract and/or native gateway
pub struct RevocationTool {
    allowance: AllowanceManager,
    token: Address,
    pool: SpenderTarget,
    native: SpenderTarget,
}

impl RevocationTool {
    pub fn new(allowance: AllowanceManager, token: Address, pool: Address, native: Address) -> Self {
        Self {
            allowance,
            token,
            pool: SpenderTarget::pool(pool),
            native: SpenderTarget::native_gateway(native),
        }
    }

    pub fn targets(&self, selection: TargetSelection) -> Vec<SpenderTarget> {
        selection.pick(self.pool, self.native)
    }

    /// Revoke every selected target; a failure never blocks the next one
    pub async fn revoke(&self, selection: TargetSelection) -> AllowanceReport {
        let report = self
            .allowance
            .revoke_targets(self.token, &self.targets(selection))
            .await;

        match report.status() {
            AllowanceStatus::Succeeded => info!("Successfully revoked approval (set allowance to 0)"),
            AllowanceStatus::PartialFailure => {
                warn!(failed = ?report.failed_targets(), "Revoke partially failed")
            }
            AllowanceStatus::Failed => warn!("Revoke failed for every selected target"),
        }

        report
    }

    /// Menu loop. Invalid answers re-prompt; closed input ends the session.
    pub async fn run_interactive<L>(&self, input: &mut L) -> Result<Vec<AllowanceReport>>
    where
        L: LineSource + ?Sized,
    {
        let mut reports = Vec::new();

        loop {
            self.print_menu();

            let selection = loop {
                let Some(line) = input.read_line(MENU_PROMPT)? else {
                    return Ok(reports);
                };
                match parse_menu_choice(&line) {
                    Some(MenuChoice::Exit) => {
                        println!("Exiting.");
                        return Ok(reports);
                    }
                    Some(MenuChoice::Revoke(selection)) => break selection,
                    None => println!("Invalid choice '{}', enter 1-4.", line.trim()),
                }
            };

            reports.push(self.revoke(selection).await);

            let again = loop {
                let Some(line) = input.read_line(CONTINUE_PROMPT)? else {
                    return Ok(reports);
                };
                match parse_yes_no(&line) {
                    Some(answer) => break answer,
                    None => println!("Please answer y or n."),
                }
            };

            if !again {
                return Ok(reports);
            }
        }
    }

    fn print_menu(&self) {
        println!();
        println!("Revoke allowance for token {}", self.token);
        println!("  1) {} ({})", self.pool.name, self.pool.spender);
        println!("  2) {} ({})", self.native.name, self.native.spender);
        println!("  3) both");
        println!("  4) exit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_choice() {
        assert_eq!(
            parse_menu_choice(" 1 "),
            Some(MenuChoice::Revoke(TargetSelection::Pool))
        );
        assert_eq!(
            parse_menu_choice("3"),
            Some(MenuChoice::Revoke(TargetSelection::Both))
        );
        assert_eq!(parse_menu_choice("4"), Some(MenuChoice::Exit));
        assert_eq!(parse_menu_choice("5"), None);
        assert_eq!(parse_menu_choice(""), None);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Y"), Some(true));
        assert_eq!(parse_yes_no("no"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }
}
