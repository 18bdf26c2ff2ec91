// File: bin/build_schema.rs
#![doc = "Binary for building schema definitions from the vault contracts."]
#[allow(unused_imports)]
use borrowable_vault;

#[cfg(not(target_arch = "wasm32"))]
extern "Rust" {
    fn module_schema() -> odra::contract_def::ContractBlueprint;
    fn casper_contract_schema() -> odra::schema::casper_contract_schema::ContractSchema;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    // The contract selected by ODRA_MODULE is exported through the extern symbols above.
    odra_build::schema(unsafe { crate::module_schema() }, unsafe {
        crate::casper_contract_schema()
    });
}
