pub mod table_filter;
