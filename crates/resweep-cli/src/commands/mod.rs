pub mod remediate;
