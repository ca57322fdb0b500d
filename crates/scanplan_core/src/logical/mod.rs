pub mod binding;
pub mod document;
pub mod logical_expression_list;
pub mod logical_scan;
pub mod operator;
pub mod proto;
