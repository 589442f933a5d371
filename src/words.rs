/// Prompts for the typing game, all upper case.
pub const WORDS: &[&str] = &[
    "PYTHON", "JAVASCRIPT", "HTML", "CSS", "VARIABLE",
    "FUNCTION", "ARRAY", "OBJECT", "LOOP", "CONDITION",
    "CLASS", "METHOD", "IMPORT", "EXPORT", "PROMISE",
    "ASYNC", "AWAIT", "DEBUG", "COMPILE", "RUNTIME",
    "ALGORITHM", "DATABASE", "SERVER", "CLIENT", "API",
    "FRAMEWORK", "LIBRARY", "SYNTAX", "ERROR", "EXCEPTION",
    "INTEGER", "STRING", "BOOLEAN", "FLOAT", "NULL",
    "UNDEFINED", "RECURSION", "ITERATION", "POINTER", "TERMINAL",
    "SHELL", "KERNEL", "NETWORK", "PROTOCOL", "ENCRYPTION",
];
