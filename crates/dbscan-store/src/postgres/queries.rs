//! Catalog queries
//!
//! All of these bind schema and table as `$1` and `$2`. Foreign keys are only
//! followed when both ends live in that schema, since related tables are
//! described by name within it.

/// Columns in ordinal order with key, nullability and identity flags
pub(super) const COLUMNS: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.character_maximum_length::int4 AS character_maximum_length,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS is_primary_key,
        (c.is_nullable = 'YES') AS is_nullable,
        (c.is_identity = 'YES' OR COALESCE(c.column_default, '') LIKE 'nextval(%') AS is_identity
    FROM information_schema.columns c
    WHERE c.table_schema = $1
      AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Live-tuple estimate maintained by the statistics collector
pub(super) const ROW_COUNT_STATISTICS: &str = r#"
    SELECT COALESCE(
        (SELECT n_live_tup
         FROM pg_stat_user_tables
         WHERE schemaname = $1 AND relname = $2),
        0
    )::int8
"#;

/// Foreign keys declared on the table, one row per column pair
pub(super) const PARENT_EDGES: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        child_att.attname::text AS child_column,
        ref.relname::text AS referenced_table,
        ref_att.attname::text AS referenced_column
    FROM pg_constraint con
    JOIN pg_class child ON child.oid = con.conrelid
    JOIN pg_namespace ns ON ns.oid = child.relnamespace
    JOIN pg_class ref ON ref.oid = con.confrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
        WITH ORDINALITY AS k(child_attnum, ref_attnum, ord)
    JOIN pg_attribute child_att
      ON child_att.attrelid = con.conrelid AND child_att.attnum = k.child_attnum
    JOIN pg_attribute ref_att
      ON ref_att.attrelid = con.confrelid AND ref_att.attnum = k.ref_attnum
    WHERE con.contype = 'f'
      AND ns.nspname = $1
      AND child.relname = $2
      AND ref.relnamespace = child.relnamespace
    ORDER BY con.conname, k.ord
"#;

/// Foreign keys on other tables that point at the table, one row per column pair
pub(super) const CHILD_EDGES: &str = r#"
    SELECT
        con.conname::text AS constraint_name,
        child.relname::text AS child_table,
        child_att.attname::text AS child_column,
        ref_att.attname::text AS referenced_column
    FROM pg_constraint con
    JOIN pg_class ref ON ref.oid = con.confrelid
    JOIN pg_namespace ns ON ns.oid = ref.relnamespace
    JOIN pg_class child ON child.oid = con.conrelid
    CROSS JOIN LATERAL unnest(con.conkey, con.confkey)
        WITH ORDINALITY AS k(child_attnum, ref_attnum, ord)
    JOIN pg_attribute child_att
      ON child_att.attrelid = con.conrelid AND child_att.attnum = k.child_attnum
    JOIN pg_attribute ref_att
      ON ref_att.attrelid = con.confrelid AND ref_att.attnum = k.ref_attnum
    WHERE con.contype = 'f'
      AND ns.nspname = $1
      AND ref.relname = $2
      AND child.relnamespace = ref.relnamespace
    ORDER BY child.relname, con.conname, k.ord
"#;

pub(super) const PING: &str = "SELECT 1";

/// Double-quote an identifier for use in SQL text.
///
/// Only ever called on names that already passed the identifier gate.
pub(super) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(super) fn exact_row_count(schema: &str, table: &str) -> String {
    format!(
        "SELECT COUNT(*)::int8 FROM {}.{}",
        quote_ident(schema),
        quote_ident(table)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_row_count_statement() {
        assert_eq!(
            exact_row_count("public", "order_items"),
            r#"SELECT COUNT(*)::int8 FROM "public"."order_items""#
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_catalog_queries_bind_schema_and_table() {
        for query in [COLUMNS, ROW_COUNT_STATISTICS, PARENT_EDGES, CHILD_EDGES] {
            assert!(query.contains("$1"));
            assert!(query.contains("$2"));
        }
    }

    #[test]
    fn test_edges_stay_within_schema() {
        assert!(PARENT_EDGES.contains("ref.relnamespace = child.relnamespace"));
        assert!(CHILD_EDGES.contains("child.relnamespace = ref.relnamespace"));
    }
}
