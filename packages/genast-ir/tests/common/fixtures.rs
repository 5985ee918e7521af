//! Test fixture generators

use std::io::Write;
use std::path::PathBuf;

use genast_ir::generic_ast::{Program, Stmt};
use genast_ir::{Normalizer, Parser, PythonNormalizer, PythonParser};
use tempfile::TempDir;

/// A small module touching most statement and expression kinds
pub const CORPUS_KITCHEN_SINK: &str = r#"
import os, sys as system
from . import sibling
from ..pkg.mod import name as alias, other
from __future__ import annotations

X: int = 1
a = b = [i * 2 for i in range(10) if i % 2]
d = {k: v for k, v in zip("ab", (1, 2))}
s = {1, 2, *rest}
t = 1, 2
e = {}
f"{a!r:>10} and {b}"
"implicit" "concat"
rb"raw bytes"

@decorator
@pkg.deco(arg, key=1)
class Base(object, metaclass=Meta):
    field = 0
    typed: str = "x"

    def method(self, a, /, b=2, *args, c, d=4, **kwargs) -> None:
        global X
        nonlocal_ = lambda x, *y: x if y else None
        try:
            yield from gen()
        except (ValueError, TypeError) as err:
            raise RuntimeError("bad") from err
        except KeyError:
            raise
        except:
            pass
        else:
            del self.field
        finally:
            return

async def runner(items):
    async with lock() as held, other():
        async for item in items:
            await item
    while True:
        break
    else:
        continue_ = 1
    for x, (y, z) in pairs:
        continue
    else:
        x += 1
    assert x, "message"
    if x < y <= z:
        pass
    elif not x:
        x = x[1:2, ::3]
    else:
        x = (y := 3)
    return x[0], x[1:], x[::2]
"#;

/// Python 2 constructs the grammar still accepts
pub const CORPUS_PYTHON2: &str = r#"
print "hello", name
print >>sys.stderr, "err"
exec code in env
"#;

pub fn parse_and_normalize(src: &str) -> Program {
    let module = PythonParser::new()
        .parse(src, "fixture.py")
        .expect("fixture parses");
    PythonNormalizer::new()
        .normalize_program(module)
        .expect("fixture normalizes")
}

/// Single statement of a normalized snippet
pub fn normalize_stmt(src: &str) -> Stmt {
    let mut program = parse_and_normalize(src);
    assert_eq!(program.len(), 1, "expected one statement in {:?}", src);
    program.remove(0)
}

/// Write `content` to `dir/name`
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture file");
    file.write_all(content.as_bytes()).expect("write fixture file");
    path
}

/// Write an executable script (mode 0755 on unix)
pub fn write_executable(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = write_file(dir, name, content);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod");
    }
    path
}
