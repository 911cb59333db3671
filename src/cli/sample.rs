//! Bundled example program for `bizspec sample`

/// A shipping-cost program: four rules competing for `envio` and one test.
pub fn sample_program() -> &'static str {
    r#"# Reglas de ejemplo
rule "Envío gratis" when carrito.total >= 100000 then envio = 0
rule "Envío base"   when envio == null or envio == undefined then envio = 9900
rule "Envío internacional" when destino == "USA" then envio = 50000
rule "Envío promocional" when cupon == "ENVIO10" then envio = 1000

# Tests
test "Orden 123" {
  given carrito.total=120000
  expect envio == 0
}
"#
}
