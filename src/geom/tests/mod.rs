mod test_ribbon;
