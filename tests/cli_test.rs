mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use common::{
    CONFIRM_REMAINING, CONFIRM_UPFRONT, INITIATE_REMAINING, INITIATE_UPFRONT, REGISTER_BANK,
    commands_file,
};
use predicates::prelude::*;
use std::process::Command;

const HEADER: &str = "order_id,status,payment_type,product_price,required_amount,total_amount_paid,upfront_remaining_balance,delivered,remitted";

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let input = commands_file(&[
        REGISTER_BANK,
        INITIATE_UPFRONT,
        CONFIRM_UPFRONT,
        INITIATE_REMAINING,
        CONFIRM_REMAINING,
        r#"{"command":"confirm_delivery","order_id":"o-1","delivery_mode":"shipping","delivery_address":"12 Market Road","satisfaction_declaration":"Received in full"}"#,
        r#"{"command":"process_remittance","order_id":"o-1","amount_remitted":"10000","settlement_date":"2026-10-01","operator_bank_name":"Escrow Bank","operator_account_number":"1111111111","payment_evidence_url":"https://media.localhost/r.pdf","processed_by":"ops-1"}"#,
    ]);

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(HEADER))
        .stdout(predicate::str::contains(
            "o-1,fully_paid,remaining,10000.00,10000.00,10000.00,0.00,true,true",
        ));

    Ok(())
}

#[test]
fn test_cli_partial_payment_report() {
    let input = commands_file(&[INITIATE_UPFRONT, CONFIRM_UPFRONT]);

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path());

    cmd.assert().success().stdout(predicate::str::contains(
        "o-1,partially_paid,upfront,10000.00,10000.00,4000.00,6000.00,false,false",
    ));
}

#[test]
fn test_cli_keeps_going_after_bad_lines() {
    let input = commands_file(&[
        "# comments and blank lines are skipped",
        "",
        "not json at all",
        INITIATE_UPFRONT,
        r#"{"command":"confirm_delivery","order_id":"o-1","delivery_mode":"organization_location","satisfaction_declaration":"ok"}"#,
        CONFIRM_UPFRONT,
    ]);

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stderr(predicate::str::contains("Error processing command"))
        .stderr(predicate::str::contains("invalid_transition"))
        .stdout(predicate::str::contains("o-1,partially_paid,upfront"));
}

#[test]
fn test_cli_reads_config_file() {
    let input = commands_file(&[INITIATE_UPFRONT]);
    let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    std::io::Write::write_all(&mut config, b"upstream_timeout_ms: 2500\n").unwrap();

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path()).arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("o-1,pending,upfront"));
}

#[test]
fn test_cli_missing_config_file_fails() {
    let input = commands_file(&[INITIATE_UPFRONT]);

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path()).arg("--config").arg("does-not-exist.yaml");

    cmd.assert().failure();
}

#[test]
fn test_cli_rejects_oversized_price_and_reports_its_line() {
    let input = commands_file(&[
        "# first line is a comment",
        r#"{"command":"initiate_payment","payment_type":"upfront","order":{"order_id":"o-big","product_id":"p-1","organization_id":"org-1","customer_id":"c-1","product_price":"79228162514264337593543950335","upfront_payment_percentage":40}}"#,
        INITIATE_UPFRONT,
    ]);

    let mut cmd = Command::new(cargo_bin!("order-escrow"));
    cmd.arg(input.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stderr(predicate::str::contains("line=2"))
        .stdout(predicate::str::contains("o-1,pending,upfront"))
        .stdout(predicate::str::contains("o-big").not());
}
